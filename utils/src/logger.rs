use std::fmt::Display;

pub fn ansi<T: Display, U: Display>(x: T, y: U) -> String {
    format!("\x1b[{y}m{x}\x1b[0m")
}

pub fn display_passed(pass: bool) {
    if pass {
        println!("{}", ansi("pass", "32;1"));
    } else {
        println!("{}", ansi("fail", 31));
    }
}

pub fn report_timing(what: &str, values: usize, secs: f32) {
    println!(
        "{what} produced {} values in {} ({} values/sec)",
        ansi(values, 36),
        ansi(format!("{secs:.3}s"), 36),
        ansi(format!("{:.0}", values as f32 / secs.max(f32::EPSILON)), 36),
    );
}
