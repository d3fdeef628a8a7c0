mod network;

pub use network::NetworkVisualizationService;
