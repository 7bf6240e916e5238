use std::sync::Arc;

use linguaflow_config::Settings;
use linguaflow_services::assessment::AssessmentService;
use linguaflow_services::proficiency::ProficiencyStore;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub assessments: Arc<AssessmentService>,
    pub proficiency: Arc<dyn ProficiencyStore>,
}
