pub mod context;
pub mod controller;
pub mod error;

pub use context::AppContext;
pub use controller::{
    ArticleView, Controller, LoadRequest, LoadTarget, LoadTicket, SearchRequest,
};
pub use error::{FetchError, NewsroomError, Result, StorageError, ValidationError};
