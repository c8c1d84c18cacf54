//! MobileNet v1 classifier built with Burn
//!
//! Depthwise-separable convolution stack with a width multiplier, global
//! average pooling and a linear classifier head. The layout mirrors the
//! network the disease weights were exported from, so the record file can be
//! loaded into it directly.

use burn::{
    module::Module,
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::{AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig},
        BatchNorm, BatchNormConfig, Dropout, DropoutConfig, Linear, LinearConfig,
        PaddingConfig2d,
    },
    tensor::{backend::Backend, Tensor},
};

use super::config::ModelConfig;

/// (output channels, stride) of the 13 depthwise-separable blocks at alpha = 1.0
const BLOCKS: [(usize, usize); 13] = [
    (64, 1),
    (128, 2),
    (128, 1),
    (256, 2),
    (256, 1),
    (512, 2),
    (512, 1),
    (512, 1),
    (512, 1),
    (512, 1),
    (512, 1),
    (1024, 2),
    (1024, 1),
];

/// Conv2d -> BatchNorm -> ReLU6
#[derive(Module, Debug)]
pub struct ConvBnRelu6<B: Backend> {
    pub conv: Conv2d<B>,
    pub bn: BatchNorm<B, 2>,
}

impl<B: Backend> ConvBnRelu6<B> {
    pub fn new(
        in_channels: usize,
        out_channels: usize,
        kernel_size: usize,
        stride: usize,
        groups: usize,
        device: &B::Device,
    ) -> Self {
        let padding = if kernel_size == 1 {
            PaddingConfig2d::Valid
        } else {
            PaddingConfig2d::Explicit(kernel_size / 2, kernel_size / 2)
        };

        let conv = Conv2dConfig::new([in_channels, out_channels], [kernel_size, kernel_size])
            .with_stride([stride, stride])
            .with_padding(padding)
            .with_groups(groups)
            .with_bias(false)
            .init(device);

        let bn = BatchNormConfig::new(out_channels)
            .with_epsilon(1e-3)
            .init(device);

        Self { conv, bn }
    }

    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.conv.forward(x);
        let x = self.bn.forward(x);
        x.clamp(0.0, 6.0)
    }
}

/// 3x3 depthwise convolution followed by a 1x1 pointwise convolution
#[derive(Module, Debug)]
pub struct DepthwiseSeparable<B: Backend> {
    pub depthwise: ConvBnRelu6<B>,
    pub pointwise: ConvBnRelu6<B>,
}

impl<B: Backend> DepthwiseSeparable<B> {
    pub fn new(in_channels: usize, out_channels: usize, stride: usize, device: &B::Device) -> Self {
        Self {
            depthwise: ConvBnRelu6::new(in_channels, in_channels, 3, stride, in_channels, device),
            pointwise: ConvBnRelu6::new(in_channels, out_channels, 1, 1, 1, device),
        }
    }

    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        self.pointwise.forward(self.depthwise.forward(x))
    }
}

/// Plant disease classifier
#[derive(Module, Debug)]
pub struct MobileNet<B: Backend> {
    pub stem: ConvBnRelu6<B>,
    pub blocks: Vec<DepthwiseSeparable<B>>,
    pub global_pool: AdaptiveAvgPool2d,
    pub dropout: Dropout,
    pub classifier: Linear<B>,

    num_classes: usize,
}

impl<B: Backend> MobileNet<B> {
    /// Create an untrained network (weights are expected to be loaded afterwards)
    pub fn new(config: &ModelConfig, device: &B::Device) -> Self {
        let mut in_channels = config.channels(32);
        let stem = ConvBnRelu6::new(config.input_channels, in_channels, 3, 2, 1, device);

        let mut blocks = Vec::with_capacity(BLOCKS.len());
        for &(base, stride) in BLOCKS.iter() {
            let out_channels = config.channels(base);
            blocks.push(DepthwiseSeparable::new(in_channels, out_channels, stride, device));
            in_channels = out_channels;
        }

        Self {
            stem,
            blocks,
            global_pool: AdaptiveAvgPool2dConfig::new([1, 1]).init(),
            dropout: DropoutConfig::new(config.dropout_rate).init(),
            classifier: LinearConfig::new(in_channels, config.num_classes).init(device),
            num_classes: config.num_classes,
        }
    }

    /// Forward pass
    ///
    /// # Arguments
    /// * `x` - Input tensor of shape [batch_size, 3, height, width]
    ///
    /// # Returns
    /// * Logits tensor of shape [batch_size, num_classes]
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 2> {
        let mut x = self.stem.forward(x);
        for block in &self.blocks {
            x = block.forward(x);
        }

        let x = self.global_pool.forward(x);
        let [batch_size, channels, _, _] = x.dims();
        let x = x.reshape([batch_size, channels]);

        let x = self.dropout.forward(x);
        self.classifier.forward(x)
    }

    /// Forward pass with softmax for inference
    pub fn forward_softmax(&self, x: Tensor<B, 4>) -> Tensor<B, 2> {
        burn::tensor::activation::softmax(self.forward(x), 1)
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{default_device, InferenceBackend};

    fn tiny_config() -> ModelConfig {
        ModelConfig::new(15, 32).with_width_multiplier(0.25)
    }

    #[test]
    fn test_block_count() {
        let device = default_device();
        let model: MobileNet<InferenceBackend> = MobileNet::new(&tiny_config(), &device);
        assert_eq!(model.blocks.len(), 13);
        assert_eq!(model.num_classes(), 15);
    }

    #[test]
    fn test_forward_shape_and_softmax() {
        let device = default_device();
        let model: MobileNet<InferenceBackend> = MobileNet::new(&tiny_config(), &device);

        let input = Tensor::<InferenceBackend, 4>::zeros([1, 3, 32, 32], &device);
        let probs = model.forward_softmax(input);
        assert_eq!(probs.dims(), [1, 15]);

        let values: Vec<f32> = probs.into_data().to_vec().unwrap();
        let sum: f32 = values.iter().sum();
        assert!((sum - 1.0).abs() < 1e-4);
        assert!(values.iter().all(|p| (0.0..=1.0).contains(p)));
    }
}
