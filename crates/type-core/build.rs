const SETTINGS: &str = "src/default_settings.toml";
const ROMAJI: &str = "src/romaji/default_romaji.toml";

fn main() {
    println!("cargo:rerun-if-changed={SETTINGS}");
    println!("cargo:rerun-if-changed={ROMAJI}");

    // The embedded defaults back `expect` calls at runtime; reject broken ones here.
    require_tables(
        SETTINGS,
        include_str!("src/default_settings.toml"),
        &["scoring", "timers", "pool", "difficulty", "quiz"],
    );
    require_tables(
        ROMAJI,
        include_str!("src/romaji/default_romaji.toml"),
        &["units"],
    );
}

fn require_tables(path: &str, content: &str, tables: &[&str]) {
    let root: toml::Table = match content.parse() {
        Ok(t) => t,
        Err(e) => panic!("{path} contains invalid TOML: {e}"),
    };
    for name in tables {
        match root.get(*name) {
            Some(toml::Value::Table(t)) if !t.is_empty() => {}
            _ => panic!("{path} is missing a non-empty [{name}] table"),
        }
    }
}
