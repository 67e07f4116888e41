use rand::Rng;

pub const BUILTIN_FACTS: &[&str] = &[
    "A straight line is the shortest path between two points on a flat grid.",
    "Taxicab distance counts only horizontal and vertical steps.",
    "Bresenham's line algorithm was written for pen plotters in 1962.",
    "Any two distinct points define exactly one straight line.",
    "A chessboard has 64 squares but 204 squares of all sizes.",
    "Pixel art editors still rasterize lines one cell at a time.",
    "The word 'grid' comes from 'gridiron', a cooking frame of iron bars.",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactDeck {
    facts: Vec<String>,
    last: Option<usize>,
}

impl FactDeck {
    /// Falls back to the built-in facts when `facts` is empty, so a deck
    /// always holds at least one fact.
    pub fn new(facts: Vec<String>) -> Self {
        let facts = if facts.is_empty() {
            BUILTIN_FACTS.iter().map(|fact| fact.to_string()).collect()
        } else {
            facts
        };
        Self { facts, last: None }
    }

    pub fn current(&self) -> Option<&str> {
        self.last.map(|index| self.facts[index].as_str())
    }

    /// Picks a fact at random, never the one drawn just before.
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> &str {
        let index = match (self.facts.len(), self.last) {
            (1, _) | (_, None) => rng.random_range(0..self.facts.len()),
            (len, Some(last)) => {
                let offset = rng.random_range(1..len);
                (last + offset) % len
            }
        };
        self.last = Some(index);
        &self.facts[index]
    }
}
