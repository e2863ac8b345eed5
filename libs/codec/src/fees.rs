//! Fixed native-value fee schedule
//!
//! Every trading action attaches a constant amount of native currency to
//! cover gas. Token-collateral actions additionally forward part of it with
//! the transfer notification so the vault can continue the flow.

use storm_types::Nano;

/// Attached value for one action, in nanos
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fee {
    /// Value of the outgoing message
    pub msg_value: Nano,
    /// Value forwarded by the token wallet, when the action has a token path
    pub forward_value: Option<Nano>,
}

impl Fee {
    const fn new(msg_value: u128, forward_value: Option<u128>) -> Self {
        Self {
            msg_value: Nano(msg_value),
            forward_value: match forward_value {
                Some(v) => Some(Nano(v)),
                None => None,
            },
        }
    }

    /// Forward value for the token-transfer envelope; zero if the action has none
    pub fn forward_or_zero(&self) -> Nano {
        self.forward_value.unwrap_or(Nano::ZERO)
    }
}

pub const ADD_MARGIN: Fee = Fee::new(350_000_000, Some(305_000_000));
/// Limit, market, stop-loss and take-profit creation
pub const CREATE_ORDER: Fee = Fee::new(225_000_000, Some(180_000_000));
pub const REMOVE_MARGIN: Fee = Fee::new(350_000_000, None);
pub const CANCEL_ORDER: Fee = Fee::new(300_000_000, None);
pub const PROVIDE_LIQUIDITY: Fee = Fee::new(350_000_000, Some(305_000_000));
pub const WITHDRAW_LIQUIDITY: Fee = Fee::new(300_000_000, None);

/// Forward value of a jetton transfer when the caller supplies none (0.001)
pub const DEFAULT_JETTON_FORWARD: Nano = Nano(1_000_000);
