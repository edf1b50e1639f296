// Controller - consumes commands and request completions against the application state
use crate::application::app_state::AppState;
use crate::application::catalog_service::CatalogService;
use crate::application::data_source::ExperimentDataSource;
use crate::application::render_sink::RenderSink;
use crate::application::requests::{RequestToken, RequestTracker};
use crate::application::view_service::ViewService;
use crate::domain::window::TimeWindow;
use crate::error::{PipelineError, RequestKind};
use crate::presentation::commands::{Command, Completion, Outcome, WindowEdge};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;

const COMPLETION_QUEUE: usize = 16;

struct Requests {
    default_view: RequestTracker,
    metric_list: RequestTracker,
    experiment_list: RequestTracker,
    metrics: RequestTracker,
    graph_data: RequestTracker,
}

impl Requests {
    fn new() -> Self {
        Self {
            default_view: RequestTracker::new(RequestKind::DefaultView),
            metric_list: RequestTracker::new(RequestKind::MetricList),
            experiment_list: RequestTracker::new(RequestKind::ExperimentList),
            metrics: RequestTracker::new(RequestKind::Metrics),
            graph_data: RequestTracker::new(RequestKind::GraphData),
        }
    }

    fn get(&self, kind: RequestKind) -> &RequestTracker {
        match kind {
            RequestKind::DefaultView => &self.default_view,
            RequestKind::MetricList => &self.metric_list,
            RequestKind::ExperimentList => &self.experiment_list,
            RequestKind::Metrics => &self.metrics,
            RequestKind::GraphData => &self.graph_data,
        }
    }

    fn get_mut(&mut self, kind: RequestKind) -> &mut RequestTracker {
        match kind {
            RequestKind::DefaultView => &mut self.default_view,
            RequestKind::MetricList => &mut self.metric_list,
            RequestKind::ExperimentList => &mut self.experiment_list,
            RequestKind::Metrics => &mut self.metrics,
            RequestKind::GraphData => &mut self.graph_data,
        }
    }

    fn any_busy(&self) -> bool {
        [
            &self.default_view,
            &self.metric_list,
            &self.experiment_list,
            &self.metrics,
            &self.graph_data,
        ]
        .iter()
        .any(|tracker| tracker.is_busy())
    }
}

/// Owns all pipeline state; commands and completions are applied one at a time
pub struct Controller<S: RenderSink> {
    state: AppState,
    sink: S,
    catalog_service: CatalogService,
    view_service: ViewService,
    requests: Requests,
    completions_tx: mpsc::Sender<Completion>,
    completions_rx: mpsc::Receiver<Completion>,
}

impl<S: RenderSink> Controller<S> {
    pub fn new(source: Arc<dyn ExperimentDataSource>, sink: S, state: AppState) -> Self {
        let (completions_tx, completions_rx) = mpsc::channel(COMPLETION_QUEUE);
        Self {
            state,
            sink,
            catalog_service: CatalogService::new(source.clone()),
            view_service: ViewService::new(source),
            requests: Requests::new(),
            completions_tx,
            completions_rx,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn is_busy(&self, kind: RequestKind) -> bool {
        self.requests.get(kind).is_busy()
    }

    /// Apply one user action. Fetches are started in the background and complete later
    /// through [`Controller::apply`].
    pub fn handle(&mut self, command: Command) -> Result<Outcome, PipelineError> {
        tracing::debug!("Handling command {:?}", command);
        match command {
            Command::LoadDefaultView => {
                let service = self.catalog_service.clone();
                self.start(RequestKind::DefaultView, move |token| async move {
                    Completion::DefaultView {
                        token,
                        result: service.default_view().await,
                    }
                })
            }
            Command::RefreshMetricList => {
                let service = self.catalog_service.clone();
                self.start(RequestKind::MetricList, move |token| async move {
                    Completion::MetricList {
                        token,
                        result: service.metric_list().await,
                    }
                })
            }
            Command::RefreshExperimentList => {
                let service = self.catalog_service.clone();
                self.start(RequestKind::ExperimentList, move |token| async move {
                    Completion::ExperimentList {
                        token,
                        result: service.experiment_list().await,
                    }
                })
            }
            Command::SelectExperiment(id) => {
                if self.state.experiments.select(id) {
                    self.requests.metrics.invalidate();
                }
                Ok(Outcome::Applied)
            }
            Command::DeselectExperiment(id) => {
                if self.state.experiments.deselect(&id) {
                    self.requests.metrics.invalidate();
                }
                Ok(Outcome::Applied)
            }
            Command::SelectMetric(metric) => {
                if self.state.metrics.select(metric) {
                    self.requests.metrics.invalidate();
                }
                Ok(Outcome::Applied)
            }
            Command::DeselectMetric(metric) => {
                if self.state.metrics.deselect(&metric) {
                    self.requests.metrics.invalidate();
                }
                Ok(Outcome::Applied)
            }
            Command::SetSourceFilter(filter) => {
                if self.state.source_filter != filter {
                    self.state.source_filter = filter;
                    self.requests.metrics.invalidate();
                }
                Ok(Outcome::Applied)
            }
            Command::SetMetricScale { metric, scale } => {
                self.state.scales.set(metric, scale);
                self.requests.metrics.invalidate();
                self.requests.graph_data.invalidate();
                Ok(Outcome::Applied)
            }
            Command::FetchMetrics => {
                let query = CatalogService::query(&self.state);
                let service = self.catalog_service.clone();
                self.start(RequestKind::Metrics, move |token| async move {
                    Completion::Metrics {
                        token,
                        result: service.metric_sources(&query).await,
                    }
                })
            }
            Command::SetGraphCount(count) => {
                self.requests.graph_data.invalidate();
                let stale = ViewService::resize_graphs(&mut self.state, count, &mut self.sink);
                Ok(Outcome::GraphsResized { stale })
            }
            Command::SetGraphName { graph, name } => {
                if !ViewService::rename_graph(&mut self.state, graph, name, &mut self.sink) {
                    tracing::warn!("Cannot rename missing graph {}", graph);
                }
                Ok(Outcome::Applied)
            }
            Command::AddMapping(mapping) => {
                let index = self
                    .state
                    .mappings
                    .add(mapping, &self.state.catalog, self.state.graphs.len())
                    .inspect_err(|e| tracing::warn!("{}", e))?;
                self.requests.graph_data.invalidate();
                Ok(Outcome::MappingAdded(index))
            }
            Command::RemoveMapping(index) => {
                let removed = self.state.mappings.remove(index).ok_or_else(|| {
                    PipelineError::InvalidMapping(format!("no mapping at index {}", index))
                })?;
                self.requests.graph_data.invalidate();
                Ok(Outcome::MappingRemoved(removed))
            }
            Command::ClearMappings => {
                self.state.mappings.clear();
                self.requests.graph_data.invalidate();
                Ok(Outcome::Applied)
            }
            Command::UpdateView => {
                if self.state.mappings.is_empty() {
                    tracing::debug!("No mappings configured, skipping graph fetch");
                    return Ok(Outcome::NothingToFetch);
                }
                let requests = self
                    .state
                    .mappings
                    .build_view_request(&self.state.catalog, &self.state.scales)?;
                let service = self.view_service.clone();
                self.start(RequestKind::GraphData, move |token| async move {
                    Completion::GraphData {
                        token,
                        result: service.graph_data(&requests).await,
                    }
                })
            }
            Command::SetTimeWindow { stime, etime } => {
                self.state.time_window = TimeWindow::new(stime, etime);
                ViewService::apply_time_window(&mut self.state, &mut self.sink);
                Ok(Outcome::Applied)
            }
            Command::SetAxisWindow {
                axis,
                edge,
                percent,
            } => {
                let range = self.state.view_window.axis_mut(axis);
                match edge {
                    WindowEdge::Min => range.set_min(percent),
                    WindowEdge::Max => range.set_max(percent),
                }
                self.sink.set_visible_window(&self.state.view_window);
                Ok(Outcome::Applied)
            }
            Command::SetLegendLabel { index, label } => {
                self.state.colours.set_label(index, label);
                self.sink.set_legend(&self.state.colours.legend());
                Ok(Outcome::Applied)
            }
            Command::ExportView => Ok(Outcome::Exported(self.state.export().to_string())),
        }
    }

    /// Apply a finished request, discarding it if it has been superseded
    pub fn apply(&mut self, completion: Completion) -> Result<Outcome, PipelineError> {
        let kind = completion.kind();
        self.requests
            .get_mut(kind)
            .complete(completion.token())
            .inspect_err(|e| tracing::debug!("{}", e))?;

        match completion {
            Completion::DefaultView { result, .. } => {
                let view = result.inspect_err(|e| tracing::error!("{}", e))?;
                let stale = ViewService::apply_default_view(&mut self.state, view, &mut self.sink);
                self.requests.metrics.invalidate();
                self.requests.graph_data.invalidate();
                if let Err(e) = self.handle(Command::FetchMetrics) {
                    tracing::warn!("Could not fetch metrics for default view: {}", e);
                }
                Ok(Outcome::DefaultViewApplied { stale })
            }
            Completion::MetricList { result, .. } => {
                self.state.available_metrics = result.inspect_err(|e| tracing::error!("{}", e))?;
                Ok(Outcome::ListUpdated(kind))
            }
            Completion::ExperimentList { result, .. } => {
                self.state.available_experiments =
                    result.inspect_err(|e| tracing::error!("{}", e))?;
                Ok(Outcome::ListUpdated(kind))
            }
            Completion::Metrics { result, .. } => {
                let payload = result.inspect_err(|e| tracing::error!("{}", e))?;
                let report = CatalogService::apply_catalog(&mut self.state, payload);
                self.requests.graph_data.invalidate();
                Ok(Outcome::CatalogUpdated(report))
            }
            Completion::GraphData { result, .. } => {
                let entries = result.inspect_err(|e| tracing::error!("{}", e))?;
                let report = ViewService::apply_graph_data(&mut self.state, &entries, &mut self.sink);
                Ok(Outcome::ViewUpdated(report))
            }
        }
    }

    /// Wait for the next completion and apply it
    pub async fn next_completion(&mut self) -> Option<Result<Outcome, PipelineError>> {
        let completion = self.completions_rx.recv().await?;
        Some(self.apply(completion))
    }

    /// Apply completions until no request is outstanding
    pub async fn settle(&mut self) -> Vec<Result<Outcome, PipelineError>> {
        let mut results = Vec::new();
        while self.requests.any_busy() {
            match self.next_completion().await {
                Some(result) => results.push(result),
                None => break,
            }
        }
        results
    }

    /// Event loop: interleave commands with completions until the command channel closes
    /// and every outstanding request has finished
    pub async fn run(mut self, mut commands: mpsc::Receiver<Command>) -> Self {
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => {
                        let result = self.handle(command);
                        log_result(&result);
                    }
                    None => break,
                },
                Some(completion) = self.completions_rx.recv() => {
                    let result = self.apply(completion);
                    log_result(&result);
                }
            }
        }

        for result in self.settle().await {
            log_result(&result);
        }
        self
    }

    fn start<F, Fut>(&mut self, kind: RequestKind, request: F) -> Result<Outcome, PipelineError>
    where
        F: FnOnce(RequestToken) -> Fut,
        Fut: Future<Output = Completion> + Send + 'static,
    {
        let token = self
            .requests
            .get_mut(kind)
            .begin()
            .inspect_err(|e| tracing::warn!("{}", e))?;
        let pending = request(token);
        let tx = self.completions_tx.clone();
        let task = tokio::spawn(async move {
            let _ = tx.send(pending.await).await;
        });
        self.requests.get_mut(kind).attach(token, task);

        tracing::debug!("Started {} request (token {})", kind, token.value());
        Ok(Outcome::RequestStarted { kind, token })
    }
}

fn log_result(result: &Result<Outcome, PipelineError>) {
    match result {
        Ok(Outcome::Exported(command)) => tracing::info!("Export: {}", command),
        Ok(outcome) => tracing::trace!("{:?}", outcome),
        Err(e) if e.is_silent() => tracing::debug!("{}", e),
        Err(e) => tracing::warn!("{}", e),
    }
}
