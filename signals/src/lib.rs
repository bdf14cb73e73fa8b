/*!
Always-valued reactive signals built over a small push-based stream engine.

A [`Signal`] is created with its current value already computed, and it stays current from a live update stream until
its [`Scope`] is disposed. Reading the value never blocks or fails. Signals derive from one another with
[`Signal::map`], [`Signal::flat_map`], [`Signal::flat_map_latest`] and [`Signal::combine_latest`], and every derived
signal is owned by the scopes of its inputs.

# Nomenclature
- fn subscribe - does not call the listener with the current value, only with later values
- fn subscribe_now - immediately calls the listener with the current value, and also with later values

# Basic usage

```rust
use steady_signals::*;

let scope = Scope::new();
let subject = Subject::new();
let count = Signal::from_stream(1, subject.observable(), &scope);
let doubled = count.map(|n| n * 2);
assert_eq!(doubled.value(), 2);

let (tx, rx) = std::sync::mpsc::channel();
let _subscription = doubled.subscribe_now(tx);
subject.send(5);
assert_eq!(doubled.value(), 10);

scope.dispose();
subject.send(6);
// disposed signals keep their last value
assert_eq!(doubled.value(), 10);
assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![2, 10]);
```

# Flattening

```rust
use steady_signals::*;

let scope = Scope::new();
let selector = Subject::new();
let celsius = Signal::constant(21.5_f64);
let kelvin = Signal::constant(294.65_f64);
let unit = Signal::from_stream("C", selector.observable(), &scope);

let temperature = unit.flat_map_latest(move |unit| if *unit == "C" { celsius.clone() } else { kelvin.clone() });
assert_eq!(temperature.value(), 21.5);
selector.send("K");
assert_eq!(temperature.value(), 294.65);
```
*/

mod broadcast;
mod error;
pub mod observable;
pub mod porcelain;
mod scope;
mod signal;
mod subscription;

pub use error::*;
pub use observable::{Observable, Sink, Subject};
pub use porcelain::*;
pub use scope::*;
pub use signal::{Signal, Value};
pub use subscription::*;
