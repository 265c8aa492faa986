use sqslite_core::Config;

/// Hand-parsed CLI flags: `host`, `port`, `redis`, `auth`. Four flags don't
/// warrant a derive-macro parser; this mirrors the teacher's own
/// `args.get(n)`/`iter().find()` style for its subcommands.
pub fn apply_cli_overrides(mut config: Config, args: &[String]) -> Config {
    if let Some(host) = flag_value(args, "host") {
        config.host = host;
    }
    if let Some(port) = flag_value(args, "port").and_then(|v| v.parse().ok()) {
        config.port = port;
    }
    if let Some(redis) = flag_value(args, "redis") {
        config.redis_addr = redis;
    }
    if let Some(auth) = flag_value(args, "auth") {
        config.redis_auth = Some(auth);
    }
    config
}

/// Accepts `--flag value`, `--flag=value`, or `flag value` (the teacher
/// tolerates bare-word subcommand flags without leading dashes).
fn flag_value(args: &[String], name: &str) -> Option<String> {
    let dashed = format!("--{name}");
    let prefix = format!("--{name}=");

    for (i, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            return Some(value.to_string());
        }
        if arg == &dashed || arg == name {
            return args.get(i + 1).cloned();
        }
    }
    None
}

pub fn print_usage() {
    println!("sqslite-server [--host HOST] [--port PORT] [--redis ADDR] [--auth SECRET]");
    println!();
    println!("  --host   bind address (default: localhost)");
    println!("  --port   bind port (default: 9394)");
    println!("  --redis  backing store address (default: 127.0.0.1:6379)");
    println!("  --auth   backing store auth secret (default: none)");
}
