use std::collections::BTreeMap;
use std::time::Instant;

use metanet_core::{
    assemble_network, collect_bidirectional_shortest_simple_paths, collect_nodes_traverse_breadth,
    collect_shortest_path_bidirectional_breadth, enhance_reactions, resolve_candidacy,
    AssemblyInput, CandidacyInput, Direction, Graph, Metabolite, Network, Omission, Participant,
    Reaction, Role, SimplificationMethod, Simplifications,
};

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mode = args.get(1).map(|s| s.as_str()).unwrap_or("all");
    let reaction_count: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(5_000);

    if mode == "help" || mode == "--help" {
        println!("Usage: metanet-bench [mode] [reaction_count]");
        println!();
        println!("Modes:");
        println!("  all           Run all generators and benchmark each (default)");
        println!("  chain         Linear pathway with currency metabolites");
        println!("  scalefree     Preferential attachment on metabolites (hub metabolites)");
        println!("  compartments  Pathway replicated across compartments with transports");
        println!("  random        Uniform random participants");
        println!();
        println!("Default reaction_count: 5000");
        return;
    }

    println!("metanet-bench");
    println!("=============");
    println!();

    let generators: Vec<(&str, fn(u64) -> Vec<Reaction>)> = match mode {
        "chain" => vec![("Linear pathway", gen_chain)],
        "scalefree" => vec![("Scale-free metabolites", gen_scale_free)],
        "compartments" => vec![("Compartment replicated", gen_compartments)],
        "random" => vec![("Uniform random", gen_random)],
        "all" => vec![
            ("Linear pathway", gen_chain as fn(u64) -> Vec<Reaction>),
            ("Scale-free metabolites", gen_scale_free),
            ("Compartment replicated", gen_compartments),
            ("Uniform random", gen_random),
        ],
        _ => {
            eprintln!("Unknown mode: {}. Use --help for options.", mode);
            return;
        }
    };

    for (name, generator) in generators {
        for compartmentalization in [false, true] {
            run_benchmark(name, generator, reaction_count, compartmentalization);
        }
    }
}

fn run_benchmark(
    name: &str,
    generator: fn(u64) -> Vec<Reaction>,
    reaction_count: u64,
    compartmentalization: bool,
) {
    println!("--- {} (compartmentalization {}) ---", name, compartmentalization);

    let t = Instant::now();
    let raw: BTreeMap<String, Reaction> = generator(reaction_count)
        .into_iter()
        .map(|r| (r.identifier.clone(), r))
        .collect();
    let reactions = enhance_reactions(&raw);
    let metabolites = collect_model_metabolites(&reactions);
    println!(
        "Generated in {:.2}s: {} reactions, {} metabolites",
        t.elapsed().as_secs_f64(),
        reactions.len(),
        metabolites.len()
    );

    let none = Simplifications::new();
    let t = Instant::now();
    let candidacy = resolve_candidacy(&CandidacyInput {
        compartmentalization,
        reactions: &reactions,
        metabolites: &metabolites,
        reactions_simplifications: &none,
        metabolites_simplifications: &none,
    });
    println!(
        "Candidacy in {:.1}ms: {} reactions, {} metabolites",
        t.elapsed().as_secs_f64() * 1000.0,
        candidacy.reactions.len(),
        candidacy.metabolites.len()
    );

    let t = Instant::now();
    let network: Network = assemble_network(&AssemblyInput {
        compartmentalization,
        strategy: SimplificationMethod::Omission,
        reactions: &reactions,
        metabolites: &metabolites,
        candidacy: &candidacy,
    })
    .into();
    let graph = Graph::from_network(&network);
    println!(
        "Assembled in {:.1}ms: {} nodes, {} links, ~{:.1}MB",
        t.elapsed().as_secs_f64() * 1000.0,
        graph.node_count(),
        graph.link_count(),
        graph.memory_usage() as f64 / 1_048_576.0
    );

    let Some(first) = network.nodes.first() else {
        println!("Empty network");
        println!();
        return;
    };
    let Some(last) = network.nodes.iter().rev().find(|n| n.entity == first.entity) else {
        return;
    };
    let (Some(source), Some(target)) =
        (graph.resolve(&first.identifier), graph.resolve(&last.identifier))
    else {
        return;
    };

    println!();
    println!("{:>8} {:>12} {:>10}", "depth", "found", "time");
    println!("{:->8} {:->12} {:->10}", "", "", "");
    for depth in [1, 2, 3, 5, 10, 20] {
        let t = Instant::now();
        let found = collect_nodes_traverse_breadth(&graph, &[source], Direction::Neighbors, depth);
        println!(
            "{:>8} {:>12} {:>8.1}ms",
            depth,
            found.len(),
            t.elapsed().as_secs_f64() * 1000.0
        );
        if found.len() >= graph.node_count() {
            println!("{:>8} (entire network reached)", "");
            break;
        }
    }

    println!();
    let t = Instant::now();
    let path = collect_shortest_path_bidirectional_breadth(
        &graph,
        source,
        target,
        Direction::Neighbors,
        &Omission::default(),
    );
    let elapsed = t.elapsed().as_secs_f64() * 1000.0;
    if path.is_empty() {
        println!(
            "Shortest path {} → {}: no path ({:.1}ms)",
            first.identifier, last.identifier, elapsed
        );
    } else {
        println!(
            "Shortest path {} → {}: {} hops in {:.1}ms",
            first.identifier,
            last.identifier,
            path.len() - 1,
            elapsed
        );
    }

    for count in [2, 5] {
        let t = Instant::now();
        let paths = collect_bidirectional_shortest_simple_paths(
            &graph,
            source,
            target,
            Direction::Neighbors,
            count,
        );
        println!(
            "{} shortest paths: {} found in {:.1}ms",
            count,
            paths.len(),
            t.elapsed().as_secs_f64() * 1000.0
        );
    }
    println!();
}

fn collect_model_metabolites(
    reactions: &BTreeMap<String, Reaction>,
) -> BTreeMap<String, Metabolite> {
    reactions
        .values()
        .flat_map(|r| r.participants.iter())
        .map(|p| {
            (
                p.metabolite.clone(),
                Metabolite {
                    identifier: p.metabolite.clone(),
                    name: p.metabolite.clone(),
                    ..Default::default()
                },
            )
        })
        .collect()
}

// Generators: O(reactions), single-threaded, deterministic

/// Simple LCG for deterministic, fast pseudo-random numbers.
struct FastRng(u64);

impl FastRng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next(&mut self, max: u64) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 33) % max
    }
    fn next_f64(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }
}

const CURRENCY: [(&str, &str); 3] = [("atp", "adp"), ("nad", "nadh"), ("h2o", "h")];

fn reaction(identifier: String, participants: Vec<Participant>, reversibility: bool) -> Reaction {
    Reaction {
        identifier,
        participants,
        reversibility,
        processes: vec!["bench".into()],
        ..Default::default()
    }
}

/// Linear pathway m0 → m1 → ... with a currency pair on every third step.
fn gen_chain(reaction_count: u64) -> Vec<Reaction> {
    let mut rng = FastRng::new(42);
    (0..reaction_count)
        .map(|i| {
            let mut participants = vec![
                Participant::new(&format!("m{}", i), "c", Role::Reactant),
                Participant::new(&format!("m{}", i + 1), "c", Role::Product),
            ];
            if i % 3 == 0 {
                let (spent, made) = CURRENCY[rng.next(CURRENCY.len() as u64) as usize];
                participants.push(Participant::new(spent, "c", Role::Reactant));
                participants.push(Participant::new(made, "c", Role::Product));
            }
            reaction(format!("R{}", i), participants, rng.next_f64() < 0.3)
        })
        .collect()
}

/// Preferential attachment on metabolites.
///
/// Each reaction draws its participants from an endpoint list, so metabolites
/// that already take part in many reactions are more likely to be drawn
/// again. Produces a few hub metabolites like water and ATP in real models.
fn gen_scale_free(reaction_count: u64) -> Vec<Reaction> {
    let mut rng = FastRng::new(12345);
    let mut endpoints: Vec<u64> = (0..5).collect();
    let mut next_metabolite = 5u64;
    let mut reactions = Vec::with_capacity(reaction_count as usize);

    for i in 0..reaction_count {
        let mut participants = Vec::with_capacity(4);
        for (slot, role) in [Role::Reactant, Role::Reactant, Role::Product, Role::Product]
            .into_iter()
            .enumerate()
        {
            // One fresh metabolite per reaction keeps the network growing
            let metabolite = if slot == 2 {
                next_metabolite += 1;
                next_metabolite - 1
            } else {
                endpoints[rng.next(endpoints.len() as u64) as usize]
            };
            endpoints.push(metabolite);
            participants.push(Participant::new(&format!("m{}", metabolite), "c", role));
        }
        reactions.push(reaction(format!("R{}", i), participants, rng.next_f64() < 0.2));
    }
    reactions
}

/// The linear pathway copied into several compartments, with a transport
/// reaction for every tenth metabolite. Copies are replicates of each
/// other, so candidacy collapses them without compartmentalization.
fn gen_compartments(reaction_count: u64) -> Vec<Reaction> {
    let compartments = ["c", "m", "p", "r"];
    let per_compartment = (reaction_count / compartments.len() as u64).max(1);
    let mut reactions = Vec::with_capacity(reaction_count as usize);

    for compartment in compartments {
        for i in 0..per_compartment {
            reactions.push(reaction(
                format!("R{}_{}", i, compartment),
                vec![
                    Participant::new(&format!("m{}", i), compartment, Role::Reactant),
                    Participant::new(&format!("m{}", i + 1), compartment, Role::Product),
                ],
                false,
            ));
        }
    }
    for i in (0..per_compartment).step_by(10) {
        for compartment in &compartments[1..] {
            reactions.push(reaction(
                format!("T{}_{}", i, compartment),
                vec![
                    Participant::new(&format!("m{}", i), "c", Role::Reactant),
                    Participant::new(&format!("m{}", i), compartment, Role::Product),
                ],
                true,
            ));
        }
    }
    reactions
}

/// Uniform random reactants and products over a metabolite pool half the
/// reaction count.
fn gen_random(reaction_count: u64) -> Vec<Reaction> {
    let mut rng = FastRng::new(7777);
    let pool = (reaction_count / 2).max(2);
    (0..reaction_count)
        .map(|i| {
            let reactants = 1 + rng.next(2);
            let products = 1 + rng.next(2);
            let mut participants = Vec::new();
            for _ in 0..reactants {
                participants.push(
                    Participant::new(&format!("m{}", rng.next(pool)), "c", Role::Reactant),
                );
            }
            for _ in 0..products {
                participants.push(
                    Participant::new(&format!("m{}", rng.next(pool)), "c", Role::Product),
                );
            }
            reaction(format!("R{}", i), participants, rng.next_f64() < 0.5)
        })
        .collect()
}
