//! Connected account and network, and change detection.

use std::{collections::VecDeque, time::Duration};

use alloy_core::primitives::Address;
use futures::Stream;

use super::Wallet;
use crate::{ChainId, LaunchpadError};

/// Snapshot of the wallet connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub account: Address,
    pub chain_id: ChainId,
}

/// A change observed on the wallet connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    AccountChanged { from: Address, to: Address },
    /// Invalidates anything derived from the previous chain, the deployment mode included.
    ChainChanged { from: ChainId, to: ChainId },
}

impl Session {
    pub async fn read<W: Wallet>(wallet: &W) -> Result<Self, LaunchpadError> {
        Ok(Self {
            account: wallet.account().await?,
            chain_id: wallet.chain_id().await?,
        })
    }

    /// Events leading from `self` to `next`, account first.
    pub fn diff(&self, next: &Session) -> Vec<SessionEvent> {
        let mut events = Vec::new();

        if self.account != next.account {
            events.push(SessionEvent::AccountChanged {
                from: self.account,
                to: next.account,
            });
        }

        if self.chain_id != next.chain_id {
            events.push(SessionEvent::ChainChanged {
                from: self.chain_id,
                to: next.chain_id,
            });
        }

        events
    }
}

struct WatchState<'a, W> {
    wallet: &'a W,
    current: Session,
    pending: VecDeque<SessionEvent>,
}

/// Poll the wallet every `interval` and yield every change relative to `initial`.
///
/// The stream ends after the first error.
pub fn watch_session<W: Wallet>(
    wallet: &W,
    initial: Session,
    interval: Duration,
) -> impl Stream<Item = Result<SessionEvent, LaunchpadError>> + '_ {
    let state = WatchState {
        wallet,
        current: initial,
        pending: VecDeque::new(),
    };

    futures::stream::try_unfold(state, move |mut state| async move {
        loop {
            if let Some(event) = state.pending.pop_front() {
                return Ok(Some((event, state)));
            }

            tokio::time::sleep(interval).await;

            let next = Session::read(state.wallet).await?;
            state.pending.extend(state.current.diff(&next));
            state.current = next;
        }
    })
}
