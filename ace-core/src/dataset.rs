//! # Divisão em Treino, Desenvolvimento e Teste
//!
//! A divisão é feita sobre documentos ou sobre sentenças, em proporções
//! (`80,10,10`) ou em `n` partições (folds) para validação cruzada.
//!
//! - Cada parte recebe `floor(proporção × total)` itens; a sobra do arredondamento vai
//!   para o treino.
//! - Nas partições, cada uma tem `total / n` itens e a última absorve a sobra.
//! - O embaralhamento é opcional e determinístico (semente fixa, padrão 31).

use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ConfigError;

pub const DEFAULT_SEED: u64 = 31;

/// Proporções normalizadas (somam 1).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataSplit {
    pub train: f64,
    pub dev: f64,
    pub test: f64,
}

impl DataSplit {
    pub fn new(train: f64, dev: f64, test: f64) -> Result<Self, ConfigError> {
        let total = train + dev + test;
        if [train, dev, test].iter().any(|w| *w < 0.0 || !w.is_finite()) || total <= 0.0 {
            return Err(ConfigError::InvalidSplit(format!("{train},{dev},{test}")));
        }
        Ok(Self {
            train: train / total,
            dev: dev / total,
            test: test / total,
        })
    }
}

impl FromStr for DataSplit {
    type Err = ConfigError;

    /// `treino,teste` ou `treino,dev,teste`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidSplit(s.to_string());
        let weights = s
            .split(',')
            .map(|w| w.trim().parse::<f64>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>, _>>()?;
        match weights.as_slice() {
            [train, test] => Self::new(*train, 0.0, *test),
            [train, dev, test] => Self::new(*train, *dev, *test),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for DataSplit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2},{:.2},{:.2}", self.train, self.dev, self.test)
    }
}

/// Unidade de divisão.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SplitUnit {
    #[default]
    Document,
    Sentence,
}

/// Embaralhamento opcional com semente.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Shuffle {
    pub enabled: bool,
    pub seed: u64,
}

impl Shuffle {
    pub fn seeded(seed: u64) -> Self {
        Self {
            enabled: true,
            seed,
        }
    }

    fn apply<T>(&self, items: &mut [T]) {
        if self.enabled {
            let mut rng = StdRng::seed_from_u64(self.seed);
            items.shuffle(&mut rng);
        }
    }
}

/// As três partes de uma divisão.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitSets<T> {
    pub train: Vec<T>,
    pub dev: Vec<T>,
    pub test: Vec<T>,
}

pub fn split_data<T>(mut items: Vec<T>, split: &DataSplit, shuffle: Shuffle) -> SplitSets<T> {
    let total = items.len();
    let dev_size = (split.dev * total as f64).floor() as usize;
    let test_size = ((split.test * total as f64).floor() as usize).min(total - dev_size);
    let train_size = total - dev_size - test_size;

    shuffle.apply(&mut items);
    let test = items.split_off(train_size + dev_size);
    let dev = items.split_off(train_size);
    info!(
        "divisão: treino {}, dev {}, teste {}",
        items.len(),
        dev.len(),
        test.len()
    );
    SplitSets {
        train: items,
        dev,
        test,
    }
}

/// `folds` partições consecutivas; a última fica com a sobra.
pub fn split_folds<T>(mut items: Vec<T>, folds: usize, shuffle: Shuffle) -> Vec<Vec<T>> {
    if folds == 0 {
        return Vec::new();
    }
    let fold_size = items.len() / folds;
    shuffle.apply(&mut items);

    let mut result = Vec::with_capacity(folds);
    let mut rest = items;
    for _ in 0..folds - 1 {
        let tail = rest.split_off(fold_size.min(rest.len()));
        result.push(rest);
        rest = tail;
    }
    result.push(rest);
    info!(
        "{} partições de {} (última com {})",
        folds,
        fold_size,
        result.last().map_or(0, Vec::len)
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_split() {
        let split: DataSplit = "80,10,10".parse().unwrap();
        assert!((split.train - 0.8).abs() < 1e-9);
        assert!((split.dev - 0.1).abs() < 1e-9);

        let two: DataSplit = "3,1".parse().unwrap();
        assert!((two.train - 0.75).abs() < 1e-9);
        assert_eq!(two.dev, 0.0);
        assert!((two.test - 0.25).abs() < 1e-9);

        assert!("80".parse::<DataSplit>().is_err());
        assert!("a,b".parse::<DataSplit>().is_err());
        assert!("0,0,0".parse::<DataSplit>().is_err());
    }

    #[test]
    fn test_remainder_goes_to_train() {
        let split: DataSplit = "60,20,20".parse().unwrap();
        let sets = split_data((0..11).collect(), &split, Shuffle::default());
        assert_eq!(sets.train, (0..7).collect::<Vec<_>>());
        assert_eq!(sets.dev, vec![7, 8]);
        assert_eq!(sets.test, vec![9, 10]);
    }

    #[test]
    fn test_shuffle_is_deterministic_and_complete() {
        let split: DataSplit = "80,10,10".parse().unwrap();
        let a = split_data((0..50).collect::<Vec<u32>>(), &split, Shuffle::seeded(DEFAULT_SEED));
        let b = split_data((0..50).collect::<Vec<u32>>(), &split, Shuffle::seeded(DEFAULT_SEED));
        assert_eq!(a, b);
        let mut all: Vec<u32> = a.train.into_iter().chain(a.dev).chain(a.test).collect();
        all.sort();
        assert_eq!(all, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_folds_last_absorbs_remainder() {
        let folds = split_folds((0..10).collect::<Vec<u32>>(), 3, Shuffle::default());
        let sizes: Vec<usize> = folds.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![3, 3, 4]);
        assert_eq!(folds[2], vec![6, 7, 8, 9]);
        assert!(split_folds(vec![1], 0, Shuffle::default()).is_empty());
    }
}
