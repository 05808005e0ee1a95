use crate::utils;

#[derive(Clone)]
pub struct Config {
    pub aws_region_name: String,
    pub aws_endpoint: Option<String>,
    pub bucket_prefix: String,
}

impl Config {
    pub fn from_env() -> Config {
        let aws_region_name = utils::get_aws_region_name_from_env();
        let aws_endpoint = utils::get_aws_endpoint_from_env();
        let bucket_prefix = utils::get_bucket_prefix_from_env();

        Config {
            aws_region_name,
            aws_endpoint,
            bucket_prefix,
        }
    }
}
