//! Synthetic pedigree generation
//!
//! Builds a complete ancestor pedigree of a given depth: every spouse below
//! the oldest generation has a parent family, and every family has a few
//! extra children besides the spouse who links it to the generation below.
//! Used by the demo binary and by tests that need a graph larger than a
//! hand-written fixture.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::fetch::InMemoryFetcher;
use crate::models::{FamilyRecord, PersonRecord, RecordId};

const GIVEN_NAMES: [&str; 12] = [
    "Anna", "Karen", "Stella", "Ida", "Marie", "Else", "Hans", "Peter", "Jens", "Niels", "Ole",
    "Lars",
];

/// Base of generated identifiers, so they look like service identifiers
const ID_BASE: u64 = 1_000_000_000;

/// A generated pedigree and the fetcher serving it
#[derive(Debug)]
pub struct SyntheticPedigree {
    pub root: RecordId,
    pub fetcher: InMemoryFetcher,
    pub families: usize,
    pub persons: usize,
}

struct Generator {
    rng: StdRng,
    next_id: u64,
    max_generations: u32,
    fetcher: InMemoryFetcher,
    families: usize,
    persons: usize,
}

impl SyntheticPedigree {
    /// Generate a pedigree `generations` families deep
    ///
    /// The same `seed` always produces the same pedigree. With one
    /// generation the root family's spouses have no recorded parents.
    #[must_use]
    pub fn generate(generations: u32, seed: u64) -> Self {
        let mut generator = Generator {
            rng: StdRng::seed_from_u64(seed),
            next_id: ID_BASE,
            max_generations: generations.max(1),
            fetcher: InMemoryFetcher::new(),
            families: 0,
            persons: 0,
        };

        let root = generator.allocate();
        generator.family(root.clone(), 0, None);

        Self {
            root,
            fetcher: generator.fetcher,
            families: generator.families,
            persons: generator.persons,
        }
    }
}

impl Generator {
    fn allocate(&mut self) -> RecordId {
        self.next_id += 1;
        RecordId::from(self.next_id)
    }

    /// Build family `id` at `generation`; `linking_child` is the spouse of
    /// the family one generation below, if any
    fn family(&mut self, id: RecordId, generation: u32, linking_child: Option<RecordId>) {
        let husband = self.allocate();
        let wife = self.allocate();

        let mut family = FamilyRecord::new(id.clone())
            .with_husband(husband.clone())
            .with_wife(wife.clone());

        let extra_children = self.rng.random_range(0..=3);
        let mut children = Vec::with_capacity(extra_children + 1);
        for _ in 0..extra_children {
            let child = self.allocate();
            let person = self.person(&child, i64::from(generation) - 1, Some(&id), None);
            self.fetcher.add_person(person);
            children.push(child);
        }
        // The linking child's record was created by the generation below
        if let Some(linking) = linking_child {
            let position = self.rng.random_range(0..=children.len());
            children.insert(position, linking);
        }
        for child in children {
            family = family.with_child(child);
        }

        let older = generation + 1 < self.max_generations;
        for spouse in [&husband, &wife] {
            let parent_family = older.then(|| self.allocate());
            let person = self.person(spouse, i64::from(generation), parent_family.as_ref(), Some(&id));
            self.fetcher.add_person(person);
            if let Some(parent_family) = parent_family {
                self.family(parent_family, generation + 1, Some(spouse.clone()));
            }
        }

        self.fetcher.add_family(family);
        self.families += 1;
    }

    fn person(
        &mut self,
        id: &RecordId,
        generation: i64,
        parent_family: Option<&RecordId>,
        own_family: Option<&RecordId>,
    ) -> PersonRecord {
        self.persons += 1;
        let name = GIVEN_NAMES[self.rng.random_range(0..GIVEN_NAMES.len())];
        let year = 2000 - 28 * generation + self.rng.random_range(-3..=3);
        let birth = format!(
            "{}-{}-{year}",
            self.rng.random_range(1..=12),
            self.rng.random_range(1..=28)
        );

        let mut person = PersonRecord::new(id.clone(), name)
            .with_birth_date(birth)
            .with_parent_family(parent_family.cloned().unwrap_or_else(|| RecordId::new("0")));
        if let Some(own) = own_family {
            person = person.with_own_family(own.clone());
        }
        person
    }
}
