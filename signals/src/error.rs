use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignalError {
    /// The signal was disposed before the awaited condition held
    #[error("signal disposed before the awaited value arrived")]
    Disposed,
}
