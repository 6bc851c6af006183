use std::sync::Arc;

use crate::adapters::{FFmpegAdapter, FFprobeAdapter};
use crate::app::{assemble_interactor::AssembleInteractor, inspect_interactor::InspectInteractor};
use crate::domain::model::PipelineSettings;
use crate::ports::{ExecutePort, ProbePort};

pub trait AppContainer: Send + Sync {
    fn assemble_interactor(&self) -> Arc<AssembleInteractor>;
    fn inspect_interactor(&self) -> Arc<InspectInteractor>;
}

pub struct DefaultAppContainer {
    assemble_interactor: Arc<AssembleInteractor>,
    inspect_interactor: Arc<InspectInteractor>,
}

impl DefaultAppContainer {
    /// Wire the real ffmpeg/ffprobe adapters
    pub fn new(settings: PipelineSettings) -> Self {
        let settings = Arc::new(settings);
        let execute_port: Arc<dyn ExecutePort> = Arc::new(FFmpegAdapter::from_settings(&settings));
        let probe_port: Arc<dyn ProbePort> = Arc::new(FFprobeAdapter::new(
            Arc::clone(&execute_port),
            settings.probe_timeout(),
        ));
        Self::with_ports(settings, execute_port, probe_port)
    }

    /// Wire arbitrary port implementations
    pub fn with_ports(
        settings: Arc<PipelineSettings>,
        execute_port: Arc<dyn ExecutePort>,
        probe_port: Arc<dyn ProbePort>,
    ) -> Self {
        let assemble_interactor = Arc::new(AssembleInteractor::new(
            Arc::clone(&settings),
            execute_port,
            Arc::clone(&probe_port),
        ));
        let inspect_interactor = Arc::new(InspectInteractor::new(settings, probe_port));

        Self {
            assemble_interactor,
            inspect_interactor,
        }
    }
}

impl AppContainer for DefaultAppContainer {
    fn assemble_interactor(&self) -> Arc<AssembleInteractor> {
        Arc::clone(&self.assemble_interactor)
    }

    fn inspect_interactor(&self) -> Arc<InspectInteractor> {
        Arc::clone(&self.inspect_interactor)
    }
}
