use rand::Rng;
use rand_chacha::ChaCha8Rng;

const PLANET_NAMES: &[&str] = &[
    "Arrakis", "Earth", "Titan", "Potato", "Hoth", "Solaris", "Athas", "Rigel VII",
    "Kharak", "Klendathu", "Tatooine", "Vega", "Vulcan", "Altair IV", "Dagobah",
    "Cybertron", "Demeter", "Eternia", "Fhloston", "Gaia", "Helliconia", "Hiigara",
    "Ishtar", "Kerbin", "Krull", "Lumen", "Acheron", "Medea", "Melancholia", "Mongo",
    "Minerva", "New Terra", "Old Terra", "Nirn", "Omega", "Pandora", "Pern", "Pyrrus",
    "Ragnarok", "Reach", "Requiem", "Riverworld", "Rosetta", "Sauria", "Skaro",
    "Terminus", "Thra", "Thundera", "Tiamat", "Trantor", "Twinsun", "Vekta",
    "Wormwood", "Zahir", "Zeist", "Ringworld", "Discworld", "Druidia", "Marklar",
];

/// Suffix for round `idx`; past the table the round number itself.
fn round_suffix(idx: usize) -> String {
    const NUMS: &[&str] = &["I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X"];
    match NUMS.get(idx) {
        Some(num) => num.to_string(),
        None => (idx + 1).to_string(),
    }
}

/// Planet names drawn without replacement. Once every name has been handed
/// out a new round starts and names come back with a numeral suffix.
#[derive(Clone, Debug)]
pub struct NamePool {
    names: Vec<String>,
    next: usize,
    round: usize,
}

impl Default for NamePool {
    fn default() -> Self {
        Self::new(PLANET_NAMES.iter().copied())
    }
}

impl NamePool {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            next: 0,
            round: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names left before the pool starts over.
    pub fn remaining(&self) -> usize {
        self.names.len() - self.next
    }

    pub fn draw(&mut self, rng: &mut ChaCha8Rng) -> String {
        if self.names.is_empty() {
            self.round += 1;
            return format!("PLANET {}", self.round);
        }

        // Partial Fisher-Yates: everything before `next` is already used.
        let pick = rng.gen_range(self.next..self.names.len());
        self.names.swap(self.next, pick);
        let base = self.names[self.next].to_uppercase();
        let name = if self.round == 0 {
            base
        } else {
            format!("{} {}", base, round_suffix(self.round))
        };

        self.next += 1;
        if self.next == self.names.len() {
            self.next = 0;
            self.round += 1;
        }
        name
    }
}
