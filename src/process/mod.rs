pub mod child;
pub mod pipe;
pub mod status;

pub use self::{
    child::Stage,
    pipe::Pipe,
    status::{PipelineOutput, StageReport},
};
