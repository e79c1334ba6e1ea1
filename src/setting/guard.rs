use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::{RwLockReadGuard, RwLockWriteGuard};

/// Shared access to a setting's value.
pub struct SettingRef<'a, T> {
    guard: RwLockReadGuard<'a, T>,
}

impl<'a, T> SettingRef<'a, T> {
    pub(super) fn new(guard: RwLockReadGuard<'a, T>) -> Self {
        Self { guard }
    }
}

impl<T> Deref for SettingRef<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T: fmt::Debug> fmt::Debug for SettingRef<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

/// Exclusive access to a setting's value.
pub struct SettingMut<'a, T> {
    guard: RwLockWriteGuard<'a, T>,
}

impl<'a, T> SettingMut<'a, T> {
    pub(super) fn new(guard: RwLockWriteGuard<'a, T>) -> Self {
        Self { guard }
    }
}

impl<T> Deref for SettingMut<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T> DerefMut for SettingMut<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}

impl<T: fmt::Debug> fmt::Debug for SettingMut<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}
