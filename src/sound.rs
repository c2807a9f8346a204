/// Receives sound timer transitions: `true` when FX18 loads a non-zero
/// value, `false` when the timer runs down to zero.
///
/// Called with the machine lock held, from either the cycle thread or the
/// timer thread. A sink must not call back into `Machine` (that deadlocks)
/// and should return quickly.
pub trait BeepSink: Send {
    fn beep(&mut self, on: bool);
}

impl<F> BeepSink for F
where
    F: FnMut(bool) + Send,
{
    fn beep(&mut self, on: bool) {
        self(on)
    }
}

/// Sink for when there is no audio device, or nobody cares.
#[derive(Debug, Default)]
pub struct Mute;

impl BeepSink for Mute {
    fn beep(&mut self, _on: bool) {}
}

#[cfg(feature = "frontend")]
pub use tone::Tone;

#[cfg(feature = "frontend")]
mod tone {
    use std::sync::mpsc::{self, Receiver, Sender};
    use std::thread;

    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
    use cpal::{FromSample, Sample, SizedSample};

    use super::BeepSink;

    const PITCH_HZ: f32 = 440.0;

    /// 440 Hz sine on the default output device.
    ///
    /// cpal streams can't leave the thread that built them, so the stream
    /// lives on its own thread and is switched on and off over a channel.
    pub struct Tone {
        tx: Sender<bool>,
    }

    impl Tone {
        pub fn new() -> Self {
            let (tx, rx) = mpsc::channel();
            thread::Builder::new()
                .name("tone".into())
                .spawn(move || {
                    if let Err(err) = Self::run(rx) {
                        log::error!("audio disabled: {err}");
                    }
                })
                .map_err(|err| log::error!("failed to spawn audio thread: {err}"))
                .ok();
            Self { tx }
        }

        fn run(rx: Receiver<bool>) -> Result<(), Box<dyn std::error::Error>> {
            let host = cpal::default_host();
            let device = host
                .default_output_device()
                .ok_or("no output device available")?;
            let supported_config = device
                .supported_output_configs()?
                .next()
                .ok_or("no supported output config")?
                .with_max_sample_rate();
            let sample_format = supported_config.sample_format();
            let config: cpal::StreamConfig = supported_config.into();

            let stream = match sample_format {
                cpal::SampleFormat::I8 => Self::build::<i8>(&device, &config),
                cpal::SampleFormat::I16 => Self::build::<i16>(&device, &config),
                cpal::SampleFormat::I32 => Self::build::<i32>(&device, &config),
                cpal::SampleFormat::I64 => Self::build::<i64>(&device, &config),
                cpal::SampleFormat::U8 => Self::build::<u8>(&device, &config),
                cpal::SampleFormat::U16 => Self::build::<u16>(&device, &config),
                cpal::SampleFormat::U32 => Self::build::<u32>(&device, &config),
                cpal::SampleFormat::U64 => Self::build::<u64>(&device, &config),
                cpal::SampleFormat::F32 => Self::build::<f32>(&device, &config),
                cpal::SampleFormat::F64 => Self::build::<f64>(&device, &config),
                sample_format => {
                    return Err(format!("unsupported sample format '{sample_format}'").into())
                }
            }?;
            stream.pause()?;

            // ends when the sender side is dropped
            for on in rx {
                if on {
                    stream.play()?;
                } else {
                    stream.pause()?;
                }
            }
            Ok(())
        }

        fn build<T>(
            device: &cpal::Device,
            config: &cpal::StreamConfig,
        ) -> Result<cpal::Stream, cpal::BuildStreamError>
        where
            T: SizedSample + FromSample<f32>,
        {
            let sample_rate = config.sample_rate.0 as f32;
            let channels = config.channels as usize;

            let mut sample_clock = 0f32;
            let mut next_value = move || {
                sample_clock = (sample_clock + 1.0) % sample_rate;
                (sample_clock * PITCH_HZ * 2.0 * std::f32::consts::PI / sample_rate).sin()
            };

            let err_fn = |err| log::error!("an error occurred on stream: {err}");

            device.build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    Self::write_data(data, channels, &mut next_value)
                },
                err_fn,
                None,
            )
        }

        fn write_data<T>(output: &mut [T], channels: usize, next_sample: &mut dyn FnMut() -> f32)
        where
            T: Sample + FromSample<f32>,
        {
            for frame in output.chunks_mut(channels) {
                let value: T = T::from_sample(next_sample());
                for sample in frame.iter_mut() {
                    *sample = value;
                }
            }
        }
    }

    impl Default for Tone {
        fn default() -> Self {
            Self::new()
        }
    }

    impl BeepSink for Tone {
        fn beep(&mut self, on: bool) {
            // audio thread gone means audio is already disabled and logged
            let _ = self.tx.send(on);
        }
    }
}
