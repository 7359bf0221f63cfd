//! Comparers and equality comparers.
//!
//! Ordering stages take a `Comparer`, grouping/join stages an
//! `EqualityComparer`. Plain closures implement both traits, so most call
//! sites never name these types. Keys are only assumed comparable (or only
//! equality-comparable); nothing here requires hashing.

use std::cmp::Ordering;
use std::marker::PhantomData;

/// Total order over `T`.
pub trait Comparer<T: ?Sized> {
    fn compare(&self, a: &T, b: &T) -> Ordering;
}

impl<T: ?Sized, F> Comparer<T> for F
where
    F: Fn(&T, &T) -> Ordering,
{
    fn compare(&self, a: &T, b: &T) -> Ordering {
        self(a, b)
    }
}

/// `Ord`-based comparer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Natural;

impl<T: Ord + ?Sized> Comparer<T> for Natural {
    fn compare(&self, a: &T, b: &T) -> Ordering {
        a.cmp(b)
    }
}

/// Presents the wrapped comparer's operands swapped.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reversed<C>(pub C);

impl<T: ?Sized, C: Comparer<T>> Comparer<T> for Reversed<C> {
    fn compare(&self, a: &T, b: &T) -> Ordering {
        self.0.compare(b, a)
    }
}

/// One link of an ordering chain: project a key, compare keys, optionally descending.
pub struct KeyComparer<F, C, K> {
    key: F,
    cmp: C,
    descending: bool,
    _key: PhantomData<fn() -> K>,
}

impl<F, C, K> KeyComparer<F, C, K> {
    pub fn new<T>(key: F, cmp: C, descending: bool) -> Self
    where
        F: Fn(&T) -> K,
    {
        Self {
            key,
            cmp,
            descending,
            _key: PhantomData,
        }
    }
}

impl<F: Clone, C: Clone, K> Clone for KeyComparer<F, C, K> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            cmp: self.cmp.clone(),
            descending: self.descending,
            _key: PhantomData,
        }
    }
}

impl<T, K, F, C> Comparer<T> for KeyComparer<F, C, K>
where
    F: Fn(&T) -> K,
    C: Comparer<K>,
{
    fn compare(&self, a: &T, b: &T) -> Ordering {
        let ka = (self.key)(a);
        let kb = (self.key)(b);
        if self.descending {
            self.cmp.compare(&kb, &ka)
        } else {
            self.cmp.compare(&ka, &kb)
        }
    }
}

/// Compound comparer: `secondary` is only consulted when `primary` ties.
///
/// Composition is associative, so any chain of `then_by` calls collapses into
/// one comparer and one sort pass.
#[derive(Debug, Clone, Copy)]
pub struct ThenBy<P, S> {
    primary: P,
    secondary: S,
}

impl<P, S> ThenBy<P, S> {
    pub fn new(primary: P, secondary: S) -> Self {
        Self { primary, secondary }
    }
}

impl<T: ?Sized, P, S> Comparer<T> for ThenBy<P, S>
where
    P: Comparer<T>,
    S: Comparer<T>,
{
    fn compare(&self, a: &T, b: &T) -> Ordering {
        match self.primary.compare(a, b) {
            Ordering::Equal => self.secondary.compare(a, b),
            decided => decided,
        }
    }
}

/// Equality over `T`.
pub trait EqualityComparer<T: ?Sized> {
    fn equals(&self, a: &T, b: &T) -> bool;
}

impl<T: ?Sized, F> EqualityComparer<T> for F
where
    F: Fn(&T, &T) -> bool,
{
    fn equals(&self, a: &T, b: &T) -> bool {
        self(a, b)
    }
}

/// `PartialEq`-based equality.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultEq;

impl<T: PartialEq + ?Sized> EqualityComparer<T> for DefaultEq {
    fn equals(&self, a: &T, b: &T) -> bool {
        a == b
    }
}

/// Equality derived from a comparer: equal iff the comparer ties.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderingEq<C>(pub C);

impl<T: ?Sized, C: Comparer<T>> EqualityComparer<T> for OrderingEq<C> {
    fn equals(&self, a: &T, b: &T) -> bool {
        self.0.compare(a, b) == Ordering::Equal
    }
}
