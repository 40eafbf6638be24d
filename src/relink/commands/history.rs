use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::DataStore;

pub fn run<S: DataStore>(store: &S) -> Result<CmdResult> {
    let history = store.relink_history()?;
    let mut result = CmdResult::default();
    if history.is_empty() {
        result.add_message(CmdMessage::info("No relink history."));
    }
    Ok(result.with_history(history))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryStore;

    #[test]
    fn lists_oldest_first() {
        let mut store = InMemoryStore::new();
        store.record_relink("/a", "/b", false, 1).unwrap();
        store.record_relink("/c", "/d", true, 4).unwrap();

        let result = run(&store).unwrap();
        assert_eq!(result.history.len(), 2);
        assert_eq!(result.history[0].old_path_regex, "/a");
        assert_eq!(result.history[1].affected_nodes, 4);
    }

    #[test]
    fn empty_history_reports() {
        let result = run(&InMemoryStore::new()).unwrap();
        assert!(result.history.is_empty());
        assert_eq!(result.messages.len(), 1);
    }
}
