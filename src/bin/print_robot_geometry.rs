extern crate optima_analytical_ik;

use std::env;
use optima_analytical_ik::robot_modules::robot_geometry_module::RobotGeometryTable;
use optima_analytical_ik::utils::utils_console::{optima_print, PrintColor, PrintMode};

fn main () {
    let args: Vec<String> = env::args().collect();
    assert_eq!(args.len(), 2, "Argument must be the given robot's name");

    let robot_name = args[1].as_str();

    // load the given robot's geometry table
    match RobotGeometryTable::new_from_robot_name(robot_name) {
        Ok(table) => {
            // prints the characteristic points, derived dimensions and axis corrections
            table.print_summary();
        }
        Err(e) => {
            optima_print(&e.to_string(), PrintMode::Println, PrintColor::Red, true);
            optima_print(&format!("available robots: {:?}", RobotGeometryTable::available_robot_names()), PrintMode::Println, PrintColor::None, false);
        }
    }
}
