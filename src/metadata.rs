use std::{
    fs::File,
    io::{Read, Write},
    path::Path,
};

use libflate::gzip::{Decoder, Encoder};
use serde_derive::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    fan::FanParams,
    march::{MarchParams, RayTrace},
};

/// Everything needed to redraw or inspect a traced fan without tracing it again.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TraceData {
    pub fan: FanParams,
    pub march: MarchParams,
    pub traces: Vec<RayTrace>,
}

impl TraceData {
    pub fn hits(&self) -> impl Iterator<Item = &RayTrace> + '_ {
        self.traces.iter().filter(|trace| trace.hit.is_some())
    }
}

/// Writes the data as gzipped bincode.
pub fn output_metadata<P: AsRef<Path>>(filename: P, data: &TraceData) -> Result<()> {
    let filename = filename.as_ref();
    let mut file = File::create(filename).map_err(|err| Error::io(filename, err))?;

    let data_bytes = bincode::serialize(data)?;
    let mut gzip_encoder = Encoder::new(Vec::new())?;
    gzip_encoder.write_all(&data_bytes)?;
    let zipped_data = gzip_encoder.finish().into_result()?;

    file.write_all(&zipped_data)
        .map_err(|err| Error::io(filename, err))?;
    Ok(())
}

pub fn read_metadata<P: AsRef<Path>>(filename: P) -> Result<TraceData> {
    let filename = filename.as_ref();
    let mut zipped_data = vec![];
    File::open(filename)
        .and_then(|mut file| file.read_to_end(&mut zipped_data))
        .map_err(|err| Error::io(filename, err))?;

    let mut decoder = Decoder::new(&zipped_data[..])?;
    let mut data = vec![];
    decoder.read_to_end(&mut data)?;

    Ok(bincode::deserialize(&data[..])?)
}
