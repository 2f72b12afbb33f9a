use slotmap::new_key_type;

new_key_type! {
    /// Handle to a foreground instance in the board's arena.
    ///
    /// Every square covered by a multi-square foreground stores the same
    /// `CellId`, so identity comparisons are handle comparisons.
    pub struct CellId;
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn ids_compare_by_identity() {
        let mut arena = SlotMap::<CellId, u32>::with_key();
        let a = arena.insert(7);
        let b = arena.insert(7);
        assert_ne!(a, b);
        assert_eq!(a, a);
    }

    #[test]
    fn removed_id_is_stale() {
        let mut arena = SlotMap::<CellId, ()>::with_key();
        let a = arena.insert(());
        arena.remove(a);
        let b = arena.insert(());
        assert!(!arena.contains_key(a));
        assert!(arena.contains_key(b));
    }
}
