/*
vpxscene library & toolset
Copyright (C) 2018 Steve Muller <steve.muller@outlook.com>

This program is free software: you can redistribute it and/or modify
it under the terms of the GNU General Public License as published by
the Free Software Foundation, either version 3 of the License, or
(at your option) any later version.

This program is distributed in the hope that it will be useful,
but WITHOUT ANY WARRANTY; without even the implied warranty of
MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
GNU General Public License for more details.

You should have received a copy of the GNU General Public License
along with this program.  If not, see <http://www.gnu.org/licenses/>.
*/

#[macro_use] // enable value_t! macro
extern crate clap;
extern crate vpxscene;

use std::collections::BTreeMap;
use std::io::{stdin, stdout, BufWriter, Cursor, Read, Seek, Write};
use std::fs::{self, File};
use std::path::Path;
use clap::{Arg, App, AppSettings, SubCommand, ArgMatches};
use vpxscene::geometry::ObjWriter;
use vpxscene::io::Debug;
use vpxscene::table::{SceneConfig, TableFile};
use vpxscene::Error;

trait ReadSeek: Read + Seek { }
impl<T> ReadSeek for T where T: Read + Seek { }

fn input_arg() -> Arg<'static, 'static> {
	Arg::with_name("input")
		.value_name("FILE")
		.help("A Visual Pinball table file (.vpx). If omitted, the file will be read from STDIN instead.")
		.short("i")
		.long("input")
		.required(false)
}

fn main() {
	let matches = App::new("vpxobj")
		.version("1.0")
		.author("Steve Muller <steve.muller@outlook.com>")
		.about("This utility reads a Visual Pinball table file (.vpx), rebuilds the meshes of its ramps, rubbers, walls and primitives, and exports them as Wavefront OBJ.")
		.setting(AppSettings::SubcommandRequired)
		.arg(Arg::with_name("verbose")
			.short("v")
			.help("Increases the debug verbosity. This will print a lot of debug messages to standard error (STDERR). Can be used up to 3 times.")
			.multiple(true)
			.takes_value(false))
		.subcommand(SubCommand::with_name("info")
			.about("Prints a summary of the table: metadata, items by type, textures and materials.")
			.arg(input_arg())
		)
		.subcommand(SubCommand::with_name("export")
			.about("Exports the table meshes as a Wavefront OBJ file.")
			.arg(input_arg())
			.arg(Arg::with_name("output")
				.value_name("FILE")
				.help("The OBJ file to write. If this parameter is not specified (or has the value '-'), the OBJ will be written to STDOUT instead.")
				.short("o")
				.long("output")
				.required(false))
			.arg(Arg::with_name("detail")
				.value_name("LEVEL")
				.help("Mesh detail level, from 0 (coarse) to 10 (fine). Defaults to 10.")
				.short("d")
				.long("detail")
				.required(false))
			.arg(Arg::with_name("scale-z")
				.value_name("FACTOR")
				.help("Scales all heights by this factor. Defaults to 1.")
				.long("scale-z")
				.required(false))
			.arg(Arg::with_name("table-height")
				.value_name("HEIGHT")
				.help("Overrides the playfield height stored in the table.")
				.long("table-height")
				.required(false))
			.arg(Arg::with_name("textures")
				.value_name("DIR")
				.help("If specified, the embedded image files are extracted into this directory.")
				.long("textures")
				.required(false))
		)
	.get_matches();

	let verbose = matches.occurrences_of("verbose") as i8;
	if let Err(e) = Debug::init(verbose) {
		eprintln!("ERROR: {}", e);
		std::process::exit(1);
	}

	if let Err(e) = dispatch(matches) {
		eprintln!("ERROR: {}", e);
		std::process::exit(1);
	}
}

fn dispatch(matches: ArgMatches) -> Result<(), Error> {
	match matches.subcommand() {
		("info", Some(submatches)) => dispatch_info(submatches),
		("export", Some(submatches)) => dispatch_export(submatches),
		_ => unreachable!("clap requires a subcommand"),
	}
}

/// Loads the table from the input file, or from STDIN buffered in memory.
fn open_table(matches: &ArgMatches) -> Result<TableFile<Box<dyn ReadSeek>>, Error> {
	let inputfile = matches.value_of("input").unwrap_or("");
	let input: Box<dyn ReadSeek> = match inputfile {
		"" | "-" => {
			let mut buffer = Vec::new();
			stdin().read_to_end(&mut buffer)?;
			Box::new(Cursor::new(buffer))
		},
		_ => Box::new(File::open(inputfile)?),
	};
	TableFile::new(input)
}

fn dispatch_info(matches: &ArgMatches) -> Result<(), Error> {
	let file = open_table(matches)?;
	let table = file.table();
	let out = stdout();
	let mut out = out.lock();

	writeln!(out, "Name:      {}", table.game_data.name)?;
	if !table.info.name.is_empty() {
		writeln!(out, "Title:     {}", table.info.name)?;
	}
	if !table.info.author.is_empty() {
		writeln!(out, "Author:    {}", table.info.author)?;
	}
	writeln!(out, "Version:   {}", table.version)?;
	let bounds = &table.game_data.bounds;
	writeln!(out, "Size:      {} x {}", bounds.width(), bounds.length())?;

	let mut by_type: BTreeMap<String, usize> = BTreeMap::new();
	for item in &table.items {
		*by_type.entry(item.item_type().to_string()).or_insert(0) += 1;
	}
	writeln!(out, "Items:     {}", table.items.len())?;
	for (item_type, count) in &by_type {
		writeln!(out, "  {:<12} {}", item_type, count)?;
	}

	writeln!(out, "Textures:  {}", table.textures.len())?;
	for texture in &table.textures {
		writeln!(out, "  {} ({}x{})", texture.name, texture.width, texture.height)?;
	}

	writeln!(out, "Materials: {}", table.game_data.materials.len())?;
	for name in &table.game_data.material_order {
		writeln!(out, "  {}", name)?;
	}
	Ok(())
}

fn dispatch_export(matches: &ArgMatches) -> Result<(), Error> {
	let mut config = SceneConfig::default();
	if matches.is_present("detail") {
		config.detail_level = value_t!(matches, "detail", f32).unwrap_or_else(|e| e.exit()).max(0.0).min(10.0);
	}
	if matches.is_present("scale-z") {
		config.scale_z = value_t!(matches, "scale-z", f32).unwrap_or_else(|e| e.exit());
	}
	if matches.is_present("table-height") {
		config.table_height = Some(value_t!(matches, "table-height", f32).unwrap_or_else(|e| e.exit()));
	}
	let outputfile = matches.value_of("output").unwrap_or("");

	let mut file = open_table(matches)?;
	let scene = file.table().build_scene(&config);

	let output: Box<dyn Write> = match outputfile {
		"" | "-" => Box::new(stdout()),
		_ => Box::new(File::create(outputfile)?),
	};
	let mut writer = ObjWriter::new(BufWriter::new(output));
	for (name, mesh) in &scene {
		writer.write_mesh(name, mesh)?;
	}
	writer.into_inner().flush()?;

	if let Some(dir) = matches.value_of("textures") {
		extract_textures(&mut file, Path::new(dir))?;
	}
	Ok(())
}

fn extract_textures<R: Read + Seek>(file: &mut TableFile<R>, dir: &Path) -> Result<(), Error> {
	fs::create_dir_all(dir)?;
	let textures = file.table().textures.clone();
	for (i, texture) in textures.iter().enumerate() {
		let data = match file.texture_data(texture)? {
			Some(data) => data,
			None => continue,
		};
		let extension = Path::new(&texture.path.replace('\\', "/"))
			.extension()
			.and_then(|e| e.to_str())
			.map(|e| e.to_ascii_lowercase())
			.unwrap_or_else(|| "bin".to_owned());
		let stem = if texture.name.is_empty() { format!("image{}", i) } else { sanitize(&texture.name) };
		fs::write(dir.join(format!("{}.{}", stem, extension)), &data)?;
	}
	Ok(())
}

/// Replaces characters that are not safe in file names.
fn sanitize(name: &str) -> String {
	name.chars().map(|c| if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' { c } else { '_' }).collect()
}
