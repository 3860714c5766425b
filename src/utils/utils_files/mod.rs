use std::fs;
use std::fs::{File, OpenOptions};
use std::io::Read;
use std::path::PathBuf;
use serde::Serialize;
use serde::de::DeserializeOwned;
use crate::utils::utils_errors::OptimaError;

/// Convenience struct that holds many class functions related to file utils.
pub struct FileUtils;
impl FileUtils {
    /// Reads contents of file and outputs it to a string.
    pub fn read_file_contents_to_string(p: &PathBuf) -> Result<String, OptimaError> {
        let mut file_res = File::open(p);
        return match &mut file_res {
            Ok(f) => {
                let mut contents = String::new();
                f.read_to_string(&mut contents)
                    .map_err(|e| OptimaError::new_serialization_error(&format!("Could not read file {:?}: {}", p, e), file!(), line!()))?;
                Ok(contents)
            }
            Err(e) => {
                Err(OptimaError::new_serialization_error(&format!("Could not open file {:?}: {}", p, e), file!(), line!()))
            }
        }
    }
    /// Returns file extension of path as string.
    pub fn get_file_extension_string(p: &PathBuf) -> Option<String> {
        let e = p.extension();
        return match e {
            None => { None }
            Some(o) => { o.to_str().map(|s| s.to_string()) }
        }
    }
    /// Saves given object to a file as a JSON string.  The object must be serializable using serde json.
    pub fn save_object_to_file_as_json<T: Serialize>(object: &T, p: &PathBuf) -> Result<(), OptimaError> {
        if let Some(parent) = p.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| OptimaError::new_serialization_error(&format!("Could not create directory {:?}: {}", parent, e), file!(), line!()))?;
            }
        }

        let mut file_res = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(p);
        return match &mut file_res {
            Ok(f) => {
                serde_json::to_writer(f, object)
                    .map_err(|e| OptimaError::new_serialization_error(&e.to_string(), file!(), line!()))?;
                Ok(())
            }
            Err(e) => {
                Err(OptimaError::new_serialization_error(&format!("Could not open file {:?}: {}", p, e), file!(), line!()))
            }
        }
    }
    /// Reads object that was serialized by serde JSON from a file.
    /// ## Example
    /// ```
    /// use std::path::Path;
    /// use nalgebra::Vector3;
    /// use optima_analytical_ik::utils::utils_files::FileUtils;
    ///
    /// let res = FileUtils::load_object_from_json_file::<Vector3<f64>>(&Path::new("does_not_exist.json").to_path_buf());
    /// assert!(res.is_err());
    /// ```
    pub fn load_object_from_json_file<T: DeserializeOwned>(p: &PathBuf) -> Result<T, OptimaError> {
        let contents = Self::read_file_contents_to_string(p)?;
        return Self::load_object_from_json_string(&contents);
    }
    pub fn load_object_from_json_string<T: DeserializeOwned>(json_str: &str) -> Result<T, OptimaError> {
        let o_res = serde_json::from_str(json_str);
        return match o_res {
            Ok(o) => { Ok(o) }
            Err(e) => {
                Err(OptimaError::new_serialization_error(&format!("load_object_from_json_string() failed.  The given json string is incompatible with the requested type ({}).", e), file!(), line!()))
            }
        }
    }
    pub fn load_object_from_toml_string<T: DeserializeOwned>(toml_str: &str) -> Result<T, OptimaError> {
        let o_res = toml::from_str(toml_str);
        return match o_res {
            Ok(o) => { Ok(o) }
            Err(e) => {
                Err(OptimaError::new_serialization_error(&format!("load_object_from_toml_string() failed.  The given toml string is incompatible with the requested type ({}).", e), file!(), line!()))
            }
        }
    }
}
