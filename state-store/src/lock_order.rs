//! Runtime lock-order tracking.
//!
//! Debug builds record every domain acquisition in a thread-local stack
//! and panic the moment a thread acquires a domain whose rank is not
//! strictly greater than everything it already holds (equal rank counts as
//! a violation too). Release builds compile the tracker down to nothing.

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Domain {
    Reference,
    Realtime,
    Status,
    Cache,
    Statistics,
}

#[cfg(debug_assertions)]
mod tracker {
    use super::Domain;
    use std::cell::RefCell;

    thread_local! {
        static HELD: RefCell<Vec<Domain>> = const { RefCell::new(Vec::new()) };
    }

    /// Marker held alongside a domain guard; records the acquisition on
    /// creation and unwinds it on drop.
    pub(crate) struct DomainToken {
        domain: Domain,
    }

    impl DomainToken {
        pub(crate) fn acquire(domain: Domain) -> Self {
            HELD.with(|held| {
                let mut held = held.borrow_mut();
                if let Some(&last) = held.last() {
                    assert!(
                        domain > last,
                        "lock-order violation: acquiring {domain:?} while holding {last:?}"
                    );
                }
                held.push(domain);
            });
            Self { domain }
        }
    }

    impl Drop for DomainToken {
        fn drop(&mut self) {
            HELD.with(|held| {
                let mut held = held.borrow_mut();
                if let Some(pos) = held.iter().rposition(|&d| d == self.domain) {
                    held.remove(pos);
                }
            });
        }
    }
}

#[cfg(not(debug_assertions))]
mod tracker {
    use super::Domain;

    pub(crate) struct DomainToken;

    impl DomainToken {
        #[inline(always)]
        pub(crate) fn acquire(_domain: Domain) -> Self {
            Self
        }
    }
}

pub(crate) use tracker::DomainToken;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_order_acquisition_passes() {
        let _a = DomainToken::acquire(Domain::Reference);
        let _b = DomainToken::acquire(Domain::Realtime);
        let _c = DomainToken::acquire(Domain::Statistics);
    }

    #[test]
    fn release_allows_reacquisition() {
        {
            let _a = DomainToken::acquire(Domain::Status);
        }
        let _b = DomainToken::acquire(Domain::Reference);
    }

    #[test]
    #[should_panic(expected = "lock-order violation")]
    fn out_of_order_acquisition_panics() {
        let _a = DomainToken::acquire(Domain::Cache);
        let _b = DomainToken::acquire(Domain::Realtime);
    }

    #[test]
    #[should_panic(expected = "lock-order violation")]
    fn same_rank_twice_panics() {
        let _a = DomainToken::acquire(Domain::Status);
        let _b = DomainToken::acquire(Domain::Status);
    }
}
