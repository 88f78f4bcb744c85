//! Tracing subscriber setup (ambient stack per spec.md §1, not part of the
//! core). Grounded on the teacher's subscriber init idiom.

pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
