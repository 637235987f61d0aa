//! Small text helpers for operator-facing messages

/// Join items into a readable list: `a`, `a & b`, `a, b & c`.
pub fn humanise_list<S: AsRef<str>>(items: &[S]) -> String {
    match items {
        [] => String::new(),
        [only] => only.as_ref().to_string(),
        [head @ .., last] => {
            let head: Vec<&str> = head.iter().map(AsRef::as_ref).collect();
            format!("{} & {}", head.join(", "), last.as_ref())
        }
    }
}
