//! Sequencing of overlapping validations
//!
//! Every load action takes a ticket. Only the outcome carrying the most
//! recently issued ticket reaches the presenter; earlier completions are
//! dropped.

use crate::runner::{ValidationRequest, ValidationRunner};
use crate::validator::Validator;
use glance_asset::Fetcher;
use glance_report::{Presenter, ReportSurface, ReportTemplates, ValidationOutcome};

/// Sequence number of one validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn sequence(self) -> u64 {
        self.0
    }
}

/// Owns the presenter and discards stale outcomes
pub struct ValidationSession<T, S> {
    presenter: Presenter<T, S>,
    latest: u64,
}

impl<T: ReportTemplates, S: ReportSurface> ValidationSession<T, S> {
    pub fn new(presenter: Presenter<T, S>) -> Self {
        Self {
            presenter,
            latest: 0,
        }
    }

    /// Start a validation, superseding any in flight
    pub fn begin(&mut self) -> Ticket {
        self.latest += 1;
        Ticket(self.latest)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.latest
    }

    /// Present an outcome if its ticket is still current; returns whether it was
    pub fn finish(&mut self, ticket: Ticket, outcome: ValidationOutcome) -> bool {
        if !self.is_current(ticket) {
            log::warn!(
                "Discarding stale validation #{} (latest is #{})",
                ticket.0,
                self.latest
            );
            return false;
        }

        self.presenter.present(outcome);
        true
    }

    /// Validate and present one request
    pub async fn run<V: Validator, F: Fetcher>(
        &mut self,
        runner: &ValidationRunner<V, F>,
        request: ValidationRequest,
    ) -> bool {
        let ticket = self.begin();
        let outcome = runner.validate(request).await;
        self.finish(ticket, outcome)
    }

    pub fn presenter(&self) -> &Presenter<T, S> {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut Presenter<T, S> {
        &mut self.presenter
    }
}
