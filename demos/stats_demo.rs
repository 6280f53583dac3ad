use chain_hash::Element;
use chain_hash::FoldHash;
use chain_hash::HashTable;
use chain_hash::TableConfig;
use chain_hash::strategy::IntHash;
use chain_hash::strategy::IntKeyEquiv;
use chain_hash::strategy::IntValueEquiv;
use clap::Parser;
use clap::ValueEnum;

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Hashing {
    Int,
    Fold,
}

#[derive(Parser, Debug)]
struct Args {
    /// Number of distinct keys to insert.
    #[arg(short = 'n', long = "count", default_value_t = 1000)]
    count: i32,

    /// Starting bucket count; must be one of the supported primes.
    #[arg(short = 'b', long = "buckets", default_value_t = 17)]
    buckets: usize,

    #[arg(short = 'l', long = "load_factor", default_value_t = 0.75)]
    load_factor: f32,

    /// Spacing between consecutive keys. Multiples of a bucket count show how
    /// identity hashing clusters.
    #[arg(short = 's', long = "stride", default_value_t = 1)]
    stride: i32,

    #[arg(long = "hashing", value_enum, default_value_t = Hashing::Int)]
    hashing: Hashing,
}

fn print_histogram(hist: &[usize]) {
    let max = hist.iter().copied().max().unwrap_or(0);
    if max == 0 {
        println!("chain histogram: empty");
        return;
    }

    println!("chain histogram:");
    for (len, &count) in hist.iter().enumerate() {
        let bar = "█".repeat(count.saturating_mul(60).div_ceil(max));
        println!("{len:>3} | {bar} ({count})");
    }
}

fn fill<H: chain_hash::ElementHasher>(
    mut table: HashTable<H, IntKeyEquiv, IntValueEquiv>,
    args: &Args,
) {
    println!(
        "Starting with {} buckets, load factor {:.2}",
        table.bucket_count(),
        table.load_factor()
    );

    for i in 0..args.count {
        let key = i.wrapping_mul(args.stride);
        if let Err(err) = table.try_insert(Element::int(key), Element::int(i)) {
            eprintln!("insert of {key} failed: {err}");
        }
    }

    println!(
        "Inserted {} keys, now {} buckets ({:.2} load)",
        table.len(),
        table.bucket_count(),
        table.current_load()
    );

    print_histogram(&table.chain_histogram());
    table.debug_stats().print();
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    let config = TableConfig::new(args.buckets, args.load_factor);

    let result = match args.hashing {
        Hashing::Int => {
            HashTable::with_config_and_strategies(config, IntHash, IntKeyEquiv, IntValueEquiv)
                .map(|table| fill(table, &args))
        }
        Hashing::Fold => HashTable::with_config_and_strategies(
            config,
            FoldHash::default(),
            IntKeyEquiv,
            IntValueEquiv,
        )
        .map(|table| fill(table, &args)),
    };

    if let Err(err) = result {
        eprintln!("cannot create table: {err}");
        std::process::exit(1);
    }
}
