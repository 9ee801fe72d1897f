use type_engine::romaji::{match_keystroke, to_pattern_sequence};

/// Print every accepted spelling per kana unit of `reading`.
pub fn patterns_cmd(reading: &str) {
    let seq = to_pattern_sequence(reading);
    println!("reading: {reading}");
    println!("canonical: {}", seq.default_romanization());
    for (i, unit) in seq.units().iter().enumerate() {
        println!("  [{i}] {}", unit.choices().join(" | "));
    }
}

/// Feed `keys` to the matcher and show how each keystroke is judged.
pub fn trace_cmd(reading: &str, keys: &str) {
    let seq = to_pattern_sequence(reading);
    let (mut unit, mut partial) = (0usize, String::new());
    let mut misses = 0;

    for key in keys.chars() {
        let r = match_keystroke(&seq, unit, &partial, key);
        if !r.matched {
            misses += 1;
            println!("{key}  miss     unit={unit} partial={partial:?}");
            continue;
        }
        unit = r.next_unit();
        partial = r.partial;
        println!(
            "{key}  ok       unit={unit} partial={partial:?} remaining={}",
            seq.remaining_from(unit, &partial)
        );
    }

    let complete = unit >= seq.len();
    println!(
        "{} ({} of {} units, {} misses)",
        if complete { "complete" } else { "incomplete" },
        unit.min(seq.len()),
        seq.len(),
        misses
    );
}
