use clap::Parser;
use clap::ValueEnum;
use f64_hash_set::HashTable;
use f64_hash_set::LoadFactor;
use f64_hash_set::bits::canonical_bits;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KeyKind {
    /// Random finite bit patterns
    Uniform,
    /// Whole numbers 1, 2, 3, ...
    Integral,
    /// Uniform values in [0, 1)
    Unit,
}

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'n', long = "count", default_value_t = 1000)]
    count: usize,

    #[arg(short = 'f', long = "load_factor", default_value_t = 0.75)]
    load_factor: f64,

    #[arg(short = 's', long = "seed", default_value_t = 3838474)]
    seed: u64,

    #[arg(short = 'k', long = "keys", value_enum, default_value_t = KeyKind::Uniform)]
    keys: KeyKind,
}

fn main() {
    let args = Args::parse();

    let load_factor = match LoadFactor::new(args.load_factor) {
        Ok(load_factor) => load_factor,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    let mut table = match HashTable::with_capacity_and_load_factor(args.count, load_factor) {
        Ok(table) => table,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    println!(
        "Created table for {} keys at load factor {}: {} slots",
        args.count,
        load_factor.get(),
        table.capacity()
    );

    let mut rng = SmallRng::seed_from_u64(args.seed);
    let mut duplicates = 0;
    for i in 0..args.count {
        let value = match args.keys {
            KeyKind::Uniform => loop {
                let value = f64::from_bits(rng.random::<u64>());
                if value.is_finite() {
                    break value;
                }
            },
            KeyKind::Integral => (i + 1) as f64,
            KeyKind::Unit => rng.random::<f64>(),
        };
        if !table.insert(canonical_bits(value)) {
            duplicates += 1;
        }
    }

    println!("Inserted {} keys ({} duplicates)", table.len(), duplicates);
    println!(
        "Final load: {:.2}%",
        (table.len() as f64 / table.capacity() as f64) * 100.0
    );

    table.print_probe_histogram();
    table.debug_stats().print();
}
