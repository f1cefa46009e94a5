use std::{
    any::type_name,
    fmt::{Debug, Display},
    hash::Hash,
    iter::Iterator,
    marker::PhantomData,
    sync::atomic::{AtomicUsize, Ordering as AtomicOrdering},
};

/// Typed numeric handle. The phantom parameter keeps a player id from being
/// handed to something expecting a card instance id.
pub struct ID<T>(usize, PhantomData<fn() -> T>);

impl<T> ID<T> {
    pub const fn from_raw(raw: usize) -> Self {
        Self(raw, PhantomData)
    }

    pub const fn raw(self) -> usize {
        self.0
    }
}

impl<T> Hash for ID<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

impl<T> Clone for ID<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ID<T> {}

impl<T> Debug for ID<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = type_name::<T>().rsplit("::").next().unwrap_or("?");
        f.write_str(&format!("'{} ID {}'", name, self.0))
    }
}

impl<T> Display for ID<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<T> PartialEq for ID<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq(&other.0)
    }
}

impl<T> Eq for ID<T> {}

impl<T> Ord for ID<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl<T> PartialOrd for ID<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Hands out sequential ids starting from zero. Used for things that are
/// numbered per game, like seats at the table.
pub struct IDFactory<I>(usize, PhantomData<I>);

impl<T> IDFactory<ID<T>> {
    pub fn new() -> Self {
        Self(0, PhantomData)
    }

    pub fn get_id(&mut self) -> ID<T> {
        let id = ID::from_raw(self.0);
        self.0 += 1;
        id
    }
}

impl<T> Default for IDFactory<ID<T>> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Iterator for IDFactory<ID<T>> {
    type Item = ID<T>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.get_id())
    }
}

/// Process wide counter. Ids taken from it are never reused, even across
/// games running in the same process.
pub struct GlobalIDCounter(AtomicUsize);

impl GlobalIDCounter {
    pub const fn new() -> Self {
        Self(AtomicUsize::new(1))
    }

    pub fn next<T>(&self) -> ID<T> {
        ID::from_raw(self.0.fetch_add(1, AtomicOrdering::Relaxed))
    }
}

/// Resolves an id into the thing it names.
pub trait IDMapper<T> {
    fn get(&self, id: ID<T>) -> Option<&T>;
    fn get_mut(&mut self, id: ID<T>) -> Option<&mut T>;
}
