//! `runway version`

/// Print the CLI version.
pub fn run(json: bool) {
    let version = env!("CARGO_PKG_VERSION");
    if json {
        println!("{}", serde_json::json!({ "name": "runway", "version": version }));
    } else {
        println!("runway {version}");
    }
}
