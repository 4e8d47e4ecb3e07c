pub mod batch;
pub mod driver;
pub mod error;
pub mod extract;
pub mod interact;
pub mod locate;
pub mod normalize;
pub(crate) mod retry;
pub mod session;
pub mod timing;

pub use batch::{run_batch, BatchOptions, BatchReport};
pub use driver::{
    Driver, ScrollTarget, SessionFactory, StaticDriver, StaticElement, StaticSessionFactory,
    WebDriverFactory, WebDriverSession,
};
pub use error::{DriverError, ScrapeError};
pub use locate::Page;
pub use session::{scrape_target, Outcome, SessionOptions, SkipReason};
pub use timing::Timing;
