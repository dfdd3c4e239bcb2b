pub trait Also: Sized {
    /// Runs `f` with a reference to the value, then returns the value.
    fn also<F: FnOnce(&Self)>(self, f: F) -> Self {
        f(&self);
        self
    }
}

impl<T> Also for T {}
