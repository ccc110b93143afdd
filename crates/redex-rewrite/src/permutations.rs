//! Lazy enumeration of ordered selections, used by orderless matching and
//! replacement to assign pattern components to target arguments.

/// Every ordered `r`-tuple of distinct indices from `0..n`, in lexicographic
/// order, produced one at a time.
///
/// Works on an index vector and a per-position countdown: advancing
/// decrements the rightmost live counter and swaps the next candidate into
/// place; an exhausted counter rotates its suffix back and carries left.
#[derive(Debug, Clone)]
pub struct Permutations {
    n: usize,
    r: usize,
    indices: Vec<usize>,
    cycles: Vec<usize>,
    started: bool,
    done: bool,
}

impl Permutations {
    pub fn new(n: usize, r: usize) -> Self {
        Self {
            n,
            r,
            indices: (0..n).collect(),
            cycles: (0..r.min(n)).map(|i| n - i).collect(),
            started: false,
            done: r > n,
        }
    }

    fn current(&self) -> Vec<usize> { self.indices[..self.r].to_vec() }
}

impl Iterator for Permutations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        if self.done {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some(self.current());
        }
        for i in (0..self.r).rev() {
            self.cycles[i] -= 1;
            if self.cycles[i] == 0 {
                self.indices[i..].rotate_left(1);
                self.cycles[i] = self.n - i;
            } else {
                let j = self.cycles[i];
                self.indices.swap(i, self.n - j);
                return Some(self.current());
            }
        }
        self.done = true;
        None
    }
}

/// `n! / (n - r)!`, the number of tuples `Permutations::new(n, r)` yields.
/// `None` when the count does not fit in a `usize`.
pub fn permutation_count(n: usize, r: usize) -> Option<usize> {
    if r > n {
        return Some(0);
    }
    ((n - r + 1)..=n).try_fold(1usize, |acc, k| acc.checked_mul(k))
}
