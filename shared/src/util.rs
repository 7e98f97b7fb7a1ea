use std::sync::atomic::{AtomicI64, Ordering};

/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Monotonic millisecond-based id sequence.
///
/// Values follow the wall clock but never repeat: two calls inside the same
/// millisecond (or after the clock steps back) get `last + 1`.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicI64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_value(&self) -> i64 {
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now_millis().max(prev + 1);
            match self
                .last
                .compare_exchange_weak(prev, candidate, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return candidate,
                Err(actual) => prev = actual,
            }
        }
    }

    /// `req-<n>`
    pub fn request_id(&self) -> String {
        format!("req-{}", self.next_value())
    }

    /// `<company-slug>-<n>`
    pub fn listing_id(&self, company: &str) -> String {
        format!("{}-{}", slugify(company), self.next_value())
    }
}

/// Lowercase ASCII alphanumerics joined by single dashes; `"dataset"` if nothing survives.
pub fn slugify(raw: &str) -> String {
    let mut slug = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        slug.push_str("dataset");
    }
    slug
}
