/// `JobCounters` records how many records flowed through each stage of a job.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JobCounters {
    pub map_tasks: u64,
    pub map_input_records: u64,
    pub map_output_records: u64,
    pub combine_input_records: u64,
    pub combine_output_records: u64,
    pub reduce_tasks: u64,
    pub reduce_input_groups: u64,
    pub reduce_input_records: u64,
    pub reduce_output_records: u64,
}

impl JobCounters {
    /// Adds the counters of a finished task to these counters.
    pub fn merge(&mut self, other: &JobCounters) {
        self.map_tasks += other.map_tasks;
        self.map_input_records += other.map_input_records;
        self.map_output_records += other.map_output_records;
        self.combine_input_records += other.combine_input_records;
        self.combine_output_records += other.combine_output_records;
        self.reduce_tasks += other.reduce_tasks;
        self.reduce_input_groups += other.reduce_input_groups;
        self.reduce_input_records += other.reduce_input_records;
        self.reduce_output_records += other.reduce_output_records;
    }
}
