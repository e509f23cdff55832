use super::models::ReviewThread;

/// Threads that still need resolving.
///
/// Both the dry-run preview and the live run select their threads through
/// this function, so the two always agree on the same snapshot.
pub fn unresolved_of(threads: &[ReviewThread]) -> Vec<&ReviewThread> {
    threads.iter().filter(|t| !t.is_resolved).collect()
}
