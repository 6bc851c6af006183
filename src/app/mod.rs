// Application layer - Use case interactors

pub mod assemble_interactor;
pub mod container;
pub mod inspect_interactor;

// Re-export interactors
pub use assemble_interactor::{AssembleInteractor, AssemblyReport, AssemblyRequest, PipelineState};
pub use container::{AppContainer, DefaultAppContainer};
pub use inspect_interactor::{InspectInteractor, ProbeReport};
