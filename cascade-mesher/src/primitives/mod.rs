/// The region of the source structure a vertex was generated from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Assignment {
    /// Index of the region in the source description
    pub region: usize,
    /// Index of the period, zero for the seed period
    pub period: usize,
}

impl Assignment {
    pub fn new(region: usize, period: usize) -> Self {
        Self { region, period }
    }
}
