//! Embedding records and the random test data they are filled with.

use anyhow::{Result, bail};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// One stored record: a decimal string key and its vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    pub key: String,
    pub vector: Vec<f32>,
}

impl Embedding {
    pub fn new(key: impl Into<String>, vector: Vec<f32>) -> Self {
        Self {
            key: key.into(),
            vector,
        }
    }

    pub fn dimension(&self) -> usize {
        self.vector.len()
    }

    /// Fail if the vector does not have exactly `dimension` elements.
    pub fn check_dimension(&self, dimension: usize) -> Result<()> {
        if self.vector.len() != dimension {
            bail!(
                "embedding {} has dimension {}, expected {}",
                self.key,
                self.vector.len(),
                dimension
            );
        }
        Ok(())
    }
}

/// Generate `count` embeddings keyed `"0"..count` with values uniform in `[0, 1)`.
///
/// Uses a seeded generator so repeated runs write identical data.
pub fn generate_embeddings(count: usize, dimension: usize, seed: u64) -> Vec<Embedding> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            let vector = (0..dimension).map(|_| rng.gen_range(0.0f32..1.0)).collect();
            Embedding::new(i.to_string(), vector)
        })
        .collect()
}
