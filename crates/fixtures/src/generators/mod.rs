//! Entity generators for fixture data.
//!
//! This module provides the field-level generators used by the builder:
//! - [`FakeData`]: seedable source of names, emails, addresses, lorem text, numbers and dates
//! - [`tenant`]: companies, roles, members and payment preferences
//! - [`work`]: the client/task hierarchy with subtasks, time logs, notes and comments
//! - [`billing`]: currency rates, monthly invoices and invoice lines

pub mod billing;
pub mod tenant;
pub mod work;

use fake::Fake;
use fake::faker::address::en::{BuildingNumber, StreetName, StreetSuffix};
use fake::faker::company::en::CompanyName;
use fake::faker::internet::en::{DomainSuffix, FreeEmailProvider, SafeEmail};
use fake::faker::lorem::en::{Paragraph, Sentence, Sentences, Word};
use fake::faker::name::en::{LastName, Name};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use time::{Duration, OffsetDateTime};

pub use billing::{BillingGenerator, task_link};
pub use tenant::{MemberTier, RoleTemplate, TenantGenerator};
pub use work::{STAGES, StageOwner, StageTemplate, WorkGenerator};

/// Lowercases and strips everything but ASCII letters and digits.
fn slug(text: &str) -> String {
    text.chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_lowercase()
}

/// Source of plausible random field values.
///
/// Seeding makes a whole run reproducible: the same seed and config produce the
/// same values in the same order.
pub struct FakeData {
    rng: StdRng,
}

impl FakeData {
    /// Creates a provider from `seed`, or from OS entropy when `None`.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(Some(seed))
    }

    pub fn person_name(&mut self) -> String {
        Name().fake_with_rng(&mut self.rng)
    }

    pub fn last_name(&mut self) -> String {
        LastName().fake_with_rng(&mut self.rng)
    }

    pub fn company_name(&mut self) -> String {
        CompanyName().fake_with_rng(&mut self.rng)
    }

    pub fn email(&mut self) -> String {
        SafeEmail().fake_with_rng(&mut self.rng)
    }

    /// Email whose local part is built from the two given names.
    pub fn email_for(&mut self, first: &str, last: &str) -> String {
        let provider: String = FreeEmailProvider().fake_with_rng(&mut self.rng);
        let suffix: u32 = self.rng.gen_range(1..9999);
        format!("{}.{}{suffix}@{provider}", slug(first), slug(last))
    }

    /// Phone number formatted `###-###-####`.
    pub fn phone(&mut self) -> String {
        let area: u32 = self.rng.gen_range(200..1000);
        let exchange: u32 = self.rng.gen_range(200..1000);
        let line: u32 = self.rng.gen_range(0..10000);
        format!("{area}-{exchange}-{line:04}")
    }

    pub fn street_address(&mut self) -> String {
        let number: String = BuildingNumber().fake_with_rng(&mut self.rng);
        let street: String = StreetName().fake_with_rng(&mut self.rng);
        let suffix: String = StreetSuffix().fake_with_rng(&mut self.rng);
        format!("{number} {street} {suffix}")
    }

    pub fn website(&mut self) -> String {
        let word: String = Word().fake_with_rng(&mut self.rng);
        let suffix: String = DomainSuffix().fake_with_rng(&mut self.rng);
        format!("https://www.{}.{suffix}", slug(&word))
    }

    pub fn sentence(&mut self) -> String {
        Sentence(3..10).fake_with_rng(&mut self.rng)
    }

    /// `count` sentences joined by spaces.
    pub fn sentences(&mut self, count: usize) -> String {
        let sentences: Vec<String> = Sentences(count..count + 1).fake_with_rng(&mut self.rng);
        sentences.join(" ")
    }

    pub fn paragraph(&mut self) -> String {
        Paragraph(3..6).fake_with_rng(&mut self.rng)
    }

    /// Uniform value in `[min, max]` rounded to `decimals` places.
    ///
    /// Drawn as an integer count of the smallest unit so both bounds are reachable
    /// and never overshot by float rounding.
    pub fn float_in(&mut self, min: f64, max: f64, decimals: u32) -> f64 {
        let scale = 10f64.powi(decimals as i32);
        let lo = (min * scale).ceil() as i64;
        let hi = (max * scale).floor() as i64;
        if hi <= lo {
            return lo as f64 / scale;
        }
        self.rng.gen_range(lo..=hi) as f64 / scale
    }

    /// A moment within the next `days` days.
    pub fn soon(&mut self, days: i64) -> OffsetDateTime {
        let seconds = self.rng.gen_range(1..=days.max(1) * 86_400);
        OffsetDateTime::now_utc() + Duration::seconds(seconds)
    }

    /// A moment within the past `days` days.
    pub fn recent(&mut self, days: i64) -> OffsetDateTime {
        let seconds = self.rng.gen_range(1..=days.max(1) * 86_400);
        OffsetDateTime::now_utc() - Duration::seconds(seconds)
    }

    /// One element of `options`, or `None` when it is empty.
    pub fn pick<T: Copy>(&mut self, options: &[T]) -> Option<T> {
        options.choose(&mut self.rng).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_in_respects_bounds_and_precision() {
        let mut fake = FakeData::seeded(1);
        for _ in 0..1000 {
            let rate = fake.float_in(45.0, 60.0, 2);
            assert!((45.0..=60.0).contains(&rate), "{rate} out of range");
            let cents = rate * 100.0;
            assert!((cents - cents.round()).abs() < 1e-6);
        }
    }

    #[test]
    fn test_float_in_degenerate_range() {
        let mut fake = FakeData::seeded(1);
        assert_eq!(fake.float_in(1.0, 1.0, 1), 1.0);
    }

    #[test]
    fn test_seeded_values_repeat() {
        let mut a = FakeData::seeded(42);
        let mut b = FakeData::seeded(42);
        assert_eq!(a.person_name(), b.person_name());
        assert_eq!(a.sentence(), b.sentence());
        assert_eq!(a.float_in(0.5, 5.0, 1), b.float_in(0.5, 5.0, 1));
    }

    #[test]
    fn test_phone_format() {
        let mut fake = FakeData::seeded(3);
        let phone = fake.phone();
        let parts: Vec<&str> = phone.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(
            parts.iter().map(|p| p.len()).collect::<Vec<_>>(),
            vec![3, 3, 4]
        );
        assert!(phone.chars().all(|c| c == '-' || c.is_ascii_digit()));
    }

    #[test]
    fn test_email_for_uses_names() {
        let mut fake = FakeData::seeded(5);
        let email = fake.email_for("pm1", "Acme, Inc.");
        assert!(email.starts_with("pm1.acmeinc"));
        assert!(email.contains('@'));
    }

    #[test]
    fn test_dates_relative_to_now() {
        let mut fake = FakeData::seeded(9);
        let now = OffsetDateTime::now_utc();
        let due = fake.soon(30);
        assert!(due > now - Duration::seconds(1));
        assert!(due <= now + Duration::days(31));
        assert!(fake.recent(1) <= OffsetDateTime::now_utc());
    }

    #[test]
    fn test_pick() {
        let mut fake = FakeData::seeded(11);
        assert_eq!(fake.pick::<u8>(&[]), None);
        assert_eq!(fake.pick(&[7]), Some(7));
    }
}
