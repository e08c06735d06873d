use optmatch::{Handler, Resolver};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut resolver = Resolver::builder()
        .default_help(true)
        .handler(
            Handler::new("hello")
                .doc("Greets somebody")
                .flag("emoji")
                .default_for("emoji", false)
                .alias("emoji", "e")
                .positional("name"),
        )
        .handler(
            Handler::new("count")
                .doc("Greets several times")
                .int_option("times")
                .positional("name"),
        )
        .option_help("emoji", "end with a heart")
        .var_name("times", "N")
        .build()
        .unwrap_or_else(|err| err.exit());

    let matched = resolver.process_env_or_exit();
    let inv = &matched.invocation;
    let name = match inv.get("name") {
        Some(optmatch::Value::Str(it)) => it.as_str(),
        _ => "world",
    };
    let times = match inv.get("times") {
        Some(optmatch::Value::Int(it)) => *it,
        _ => 1,
    };
    let bang = if inv.flag("emoji") { "❣️" } else { "!" };
    for _ in 0..times {
        println!("Hello {name}{bang}");
    }
}
