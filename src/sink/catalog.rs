use super::Sink;

/// The sinks collected by one list query.
///
/// A catalog is cleared before every load and filled in arrival order. It is
/// only marked loaded once the end of the list was seen, so an empty catalog
/// can still be told apart from one whose load never finished.
#[derive(Debug, Clone, Default)]
pub struct SinkCatalog {
    sinks: Vec<Sink>,
    loaded: bool,
}

impl SinkCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.sinks.clear();
        self.loaded = false;
    }

    pub fn push(&mut self, sink: Sink) {
        self.sinks.push(sink);
    }

    /// Called on the end-of-list marker.
    pub fn finish(&mut self) {
        self.loaded = true;
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn sort_by_index(&mut self) {
        self.sinks.sort_by_key(|s| s.index);
    }
}

impl std::ops::Deref for SinkCatalog {
    type Target = [Sink];
    fn deref(&self) -> &Self::Target {
        &self.sinks
    }
}

impl FromIterator<Sink> for SinkCatalog {
    fn from_iter<I: IntoIterator<Item = Sink>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for sink in iter {
            catalog.push(sink);
        }
        catalog.finish();
        catalog
    }
}
