//! welltab-engine - table model, undoable commands and column statistics.

pub mod engine;

#[cfg(test)]
mod tests {
    use crate::engine::{Command, History, Table, column_statistics};

    #[test]
    fn test_edit_then_statistics_follow_undo() {
        let mut table = Table::from_rows(["p"], [vec!["10"], vec!["20"]]);
        let mut history = History::new();

        let edit = Command::set_cell(&table, 1, 0, "40");
        history.push(&mut table, edit);
        let mean = column_statistics(&table, 0).and_then(|s| s.summary).map(|s| s.mean);
        assert_eq!(mean, Some(25.0));

        history.undo(&mut table).unwrap();
        let mean = column_statistics(&table, 0).and_then(|s| s.summary).map(|s| s.mean);
        assert_eq!(mean, Some(15.0));
    }
}
