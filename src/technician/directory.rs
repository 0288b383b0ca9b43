use super::types::{Review, Technician};

/// Source of technician records.
///
/// The only implementation today is static; a remote directory would plug in here.
#[cfg_attr(test, mockall::automock)]
pub trait TechnicianDirectory: Send + Sync {
    /// The technician every booking is assigned to
    fn primary_technician(&self) -> Technician;
}

/// Directory backed by a single fixed record. No randomness, no I/O.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticTechnicianDirectory;

impl StaticTechnicianDirectory {
    pub fn new() -> Self {
        Self
    }
}

impl TechnicianDirectory for StaticTechnicianDirectory {
    fn primary_technician(&self) -> Technician {
        Technician {
            id: "camilo-murcia".to_string(),
            name: "Camilo Andrés Murcia Romero".to_string(),
            title: "Systems Engineer (9th semester)".to_string(),
            experience: "More than 15 years of technical experience".to_string(),
            bio: "Specialist in preventive and corrective maintenance of computer equipment, \
                  with a long track record in corporate and home solutions."
                .to_string(),
            total_services_completed: 542,
            reviews: vec![
                Review::new("Juan Pérez", 5, "Excellent service, very punctual and professional.", "15/10/2023"),
                Review::new("María García", 5, "Solved a network problem nobody else could. Highly recommended.", "02/11/2023"),
                Review::new("Carlos Ruiz", 4, "Very good job maintaining my laptop.", "20/11/2023"),
                Review::new("Ana Martínez", 5, "Camilo is very honest and explains everything clearly.", "05/12/2023"),
            ],
        }
    }
}
