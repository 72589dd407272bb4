//! Live note storage
//!
//! Notes are kept in spawn order. Resolution happens during a sweep that removes
//! notes in place, so a resolved note is never visited (or resolved) again.

use serde::{Deserialize, Serialize};

use super::note::Note;

/// Ordered set of live notes for one session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NoteRegistry {
    notes: Vec<Note>,
}

impl NoteRegistry {
    pub fn new() -> Self {
        Self { notes: Vec::new() }
    }

    pub fn spawn(&mut self, note: Note) {
        self.notes.push(note);
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Live notes in spawn order
    pub fn iter(&self) -> impl Iterator<Item = &Note> {
        self.notes.iter()
    }

    pub fn as_slice(&self) -> &[Note] {
        &self.notes
    }

    pub fn get(&self, id: u32) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    /// Visit every note in spawn order. When `visit` returns `Some`, the note is
    /// removed before the next one is visited. Returns the removed notes with
    /// their outcomes, in visit order.
    pub fn sweep<T>(&mut self, mut visit: impl FnMut(&mut Note) -> Option<T>) -> Vec<(Note, T)> {
        let mut removed = Vec::new();
        let mut i = 0;
        while i < self.notes.len() {
            match visit(&mut self.notes[i]) {
                Some(outcome) => removed.push((self.notes.remove(i), outcome)),
                None => i += 1,
            }
        }
        removed
    }

    /// Drop every live note, returning their ids for the presentation layer
    pub fn clear(&mut self) -> Vec<u32> {
        self.notes.drain(..).map(|n| n.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::note::NoteKind;
    use glam::Vec2;

    fn note(id: u32) -> Note {
        Note::new(id, NoteKind::Melody, Vec2::new(0.0, id as f32), 1.0)
    }

    #[test]
    fn test_spawn_keeps_order() {
        let mut registry = NoteRegistry::new();
        for id in 1..=3 {
            registry.spawn(note(id));
        }
        let ids: Vec<_> = registry.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_sweep_removes_in_place() {
        let mut registry = NoteRegistry::new();
        for id in 1..=5 {
            registry.spawn(note(id));
        }

        let mut visited = Vec::new();
        let removed = registry.sweep(|n| {
            visited.push(n.id);
            n.pos.y += 10.0;
            (n.id % 2 == 0).then_some(n.id * 100)
        });

        assert_eq!(visited, vec![1, 2, 3, 4, 5]);
        let removed: Vec<_> = removed.iter().map(|(n, out)| (n.id, *out)).collect();
        assert_eq!(removed, vec![(2, 200), (4, 400)]);

        let remaining: Vec<_> = registry.iter().map(|n| n.id).collect();
        assert_eq!(remaining, vec![1, 3, 5]);
        // Mutations made during the sweep stick
        assert_eq!(registry.get(3).map(|n| n.pos.y), Some(13.0));
    }

    #[test]
    fn test_resolved_note_not_revisited() {
        let mut registry = NoteRegistry::new();
        registry.spawn(note(1));
        let first = registry.sweep(|_| Some(()));
        assert_eq!(first.len(), 1);
        let second = registry.sweep(|_| Some(()));
        assert!(second.is_empty());
    }

    #[test]
    fn test_clear_empties() {
        let mut registry = NoteRegistry::new();
        registry.spawn(note(1));
        registry.spawn(note(2));
        assert_eq!(registry.clear(), vec![1, 2]);
        assert!(registry.is_empty());
        assert!(registry.clear().is_empty());
    }
}
