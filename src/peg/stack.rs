//! Transactional value stack
//!
//! Actions communicate through a LIFO stack of user values. Composite rules
//! open a snapshot before trying their children and either restore it (the
//! attempt failed, so every push/pop since is undone) or discard it (the
//! attempt succeeded, keep the current contents).
//!
//! Snapshots are full copies of the value vector. They nest: each restore or
//! discard closes the innermost open snapshot.

use super::error::StackError;

/// LIFO stack of parse values with nested snapshots
#[derive(Debug, Clone)]
pub struct ValueStack<V> {
    values: Vec<V>,
    snapshots: Vec<Vec<V>>,
}

impl<V> Default for ValueStack<V> {
    fn default() -> Self {
        Self {
            values: Vec::new(),
            snapshots: Vec::new(),
        }
    }
}

impl<V> ValueStack<V> {
    /// Create an empty stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of values on the stack
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the stack holds no values
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Push a value on top
    #[inline]
    pub fn push(&mut self, value: V) {
        self.values.push(value);
    }

    /// Insert a value `down` positions below the top
    ///
    /// `down == len()` inserts at the bottom.
    pub fn push_at(&mut self, down: usize, value: V) -> Result<(), StackError> {
        let len = self.len();
        if down > len {
            return Err(StackError::OutOfRange { down, len });
        }
        self.values.insert(len - down, value);
        Ok(())
    }

    /// Remove and return the top value
    pub fn pop(&mut self) -> Result<V, StackError> {
        self.values
            .pop()
            .ok_or(StackError::OutOfRange { down: 0, len: 0 })
    }

    /// Remove and return the value `down` positions below the top
    pub fn pop_at(&mut self, down: usize) -> Result<V, StackError> {
        let idx = self.index_of(down)?;
        Ok(self.values.remove(idx))
    }

    /// The top value
    pub fn peek(&self) -> Result<&V, StackError> {
        self.peek_at(0)
    }

    /// The value `down` positions below the top
    pub fn peek_at(&self, down: usize) -> Result<&V, StackError> {
        let idx = self.index_of(down)?;
        Ok(&self.values[idx])
    }

    /// Replace the top value, returning the old one
    pub fn poke(&mut self, value: V) -> Result<V, StackError> {
        self.poke_at(0, value)
    }

    /// Replace the value `down` positions below the top, returning the old one
    pub fn poke_at(&mut self, down: usize, value: V) -> Result<V, StackError> {
        let idx = self.index_of(down)?;
        Ok(std::mem::replace(&mut self.values[idx], value))
    }

    /// Swap the two topmost values
    pub fn swap(&mut self) -> Result<(), StackError> {
        let len = self.len();
        if len < 2 {
            return Err(StackError::OutOfRange { down: 1, len });
        }
        self.values.swap(len - 1, len - 2);
        Ok(())
    }

    /// Remove all values; open snapshots are unaffected
    #[inline]
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Iterate from bottom to top
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &V> + ExactSizeIterator {
        self.values.iter()
    }

    /// Consume the stack, returning values bottom to top
    pub fn into_vec(self) -> Vec<V> {
        self.values
    }

    /// Number of open snapshots
    #[inline]
    pub fn snapshot_depth(&self) -> usize {
        self.snapshots.len()
    }

    /// Restore the innermost snapshot and close it
    pub fn restore_snapshot(&mut self) -> Result<(), StackError> {
        let saved = self.snapshots.pop().ok_or(StackError::NoSnapshot)?;
        self.values = saved;
        Ok(())
    }

    /// Close the innermost snapshot, keeping the current contents
    pub fn discard_snapshot(&mut self) -> Result<(), StackError> {
        self.snapshots
            .pop()
            .map(drop)
            .ok_or(StackError::NoSnapshot)
    }

    /// Close the innermost snapshot, restoring it when `restore` is set
    pub fn remove_snapshot(&mut self, restore: bool) -> Result<(), StackError> {
        if restore {
            self.restore_snapshot()
        } else {
            self.discard_snapshot()
        }
    }

    #[inline]
    fn index_of(&self, down: usize) -> Result<usize, StackError> {
        let len = self.len();
        if down >= len {
            return Err(StackError::OutOfRange { down, len });
        }
        Ok(len - 1 - down)
    }
}

impl<V: Clone> ValueStack<V> {
    /// Push a copy of the top value
    pub fn dup(&mut self) -> Result<(), StackError> {
        let top = self.peek()?.clone();
        self.push(top);
        Ok(())
    }

    /// Copy of the contents, bottom to top
    pub fn to_vec(&self) -> Vec<V> {
        self.values.clone()
    }

    /// Open a snapshot of the current contents
    pub fn take_snapshot(&mut self) {
        self.snapshots.push(self.values.clone());
    }
}

impl<V> FromIterator<V> for ValueStack<V> {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
            snapshots: Vec::new(),
        }
    }
}
